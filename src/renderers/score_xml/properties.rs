//! Property writer and the common item property block
//!
//! `write_property` decides whether a property is written at all and how
//! its value is encoded. Styled properties are never written; lengths and
//! offsets are compared fuzzily and converted to spatium units; the font
//! style bitmask is split into one tag per flag.

use crate::models::{
    Element, FontStyle, Pid, PropertyFlags, PropertyType, PropertyValue, Style, DPMM, MAX_TAGS,
};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::links::write_link_tags;

/// Values closer than this to their default are not written
const FUZZ: f64 = 0.0001;

pub fn write_property(xml: &mut XmlWriter, s: ScoreRef, e: &Element, pid: Pid) {
    let flags = e.property_flags(pid);
    if flags == PropertyFlags::Styled {
        return;
    }
    let style = s.style();
    let Some(value) = e.get_property(style, pid) else {
        log::debug!("{} invalid property {:?} <{}>", e.type_name(), pid, pid.xml_name());
        return;
    };
    let default = e.property_default(style, pid);

    match pid.property_type() {
        PropertyType::FontStyle => {
            let fs = FontStyle(value.to_int());
            let ds = FontStyle(default.map(|d| d.to_int()).unwrap_or(0));
            for (tag, bit) in FontStyle::FLAGS {
                if fs.has(bit) != ds.has(bit) {
                    xml.tag(tag, fs.has(bit));
                }
            }
        }
        PropertyType::Millimetre => {
            // stored in raster units
            let v = value.to_real();
            if let Some(d) = &default {
                if (v - d.to_real()).abs() < FUZZ {
                    return;
                }
            }
            xml.tag_property(pid.xml_name(), &PropertyValue::Spatium(v / s.spatium()), None);
        }
        PropertyType::Point => {
            let p = value.to_point();
            if let Some(d) = &default {
                let q = d.to_point();
                if (p.x - q.x).abs() < FUZZ && (p.y - q.y).abs() < FUZZ {
                    return;
                }
            }
            let scale = if e.offset_spatium_dependent { s.spatium() } else { DPMM };
            xml.tag_point(pid.xml_name(), p / scale);
        }
        _ => xml.tag_property(pid.xml_name(), &value, default.as_ref()),
    }
}

/// Write every property backed by the style sheet
pub fn write_styled_properties(xml: &mut XmlWriter, s: ScoreRef, e: &Element) {
    for sp in &e.styled {
        write_property(xml, s, e, sp.pid);
    }
}

/// Styled-table properties that are overridden on this instance
pub fn write_unstyled_properties(xml: &mut XmlWriter, s: ScoreRef, e: &Element) {
    for sp in &e.styled {
        if !e.is_styled(sp.pid) {
            write_property(xml, s, e, sp.pid);
        }
    }
}

/// Forces the global autoplace toggle on while alive, restoring it on drop
pub struct AutoplaceOverride<'a> {
    style: &'a Style,
    prior: bool,
}

impl<'a> AutoplaceOverride<'a> {
    pub fn enable(style: &'a Style) -> Self {
        let prior = style.autoplace_enabled();
        style.set_autoplace_enabled(true);
        Self { style, prior }
    }
}

impl Drop for AutoplaceOverride<'_> {
    fn drop(&mut self) {
        self.style.set_autoplace_enabled(self.prior);
    }
}

/// Block every element writes: autoplace, links, track, position, layer tag
/// and the instance-only layout properties
pub fn write_item_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    {
        // the element's own value, measured against autoplace enabled
        let _guard = (!s.style().autoplace_enabled()).then(|| AutoplaceOverride::enable(s.style()));
        write_property(xml, s, e, Pid::Autoplace);
    }

    write_link_tags(xml, ctx, s, e);

    if let Some(track) = e.track {
        // beam tracks are recomputed by layout
        if (ctx.write_track() || e.track != ctx.cur_track()) && !e.is_beam() {
            xml.tag("track", track as i32 + ctx.track_diff());
        }
    }
    if ctx.write_position() {
        let rtick = s
            .score
            .tick2measure(e.tick)
            .map(|m| e.tick - s.score.measures[m].tick)
            .unwrap_or(e.tick);
        xml.tag_property(Pid::Position.xml_name(), &PropertyValue::Fraction(rtick), None);
    }
    if e.tag != 1 {
        if let Some(i) = (1..MAX_TAGS).find(|i| e.tag == 1u32 << i) {
            if let Some(name) = s.score.layer_tags.get(i) {
                xml.tag("tag", name.as_str());
            }
        }
    }
    for pid in [Pid::Offset, Pid::Color, Pid::Visible, Pid::Z, Pid::Placement] {
        if e.property_flags(pid) == PropertyFlags::NoStyle {
            write_property(xml, s, e, pid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::models::{Document, ElementData, PointF, Score, Sid};

    fn doc_with(e: Element) -> Document {
        let mut score = Score::new(1);
        score.add(e);
        Document::new(score)
    }

    fn write_one(doc: &Document, f: impl FnOnce(&mut XmlWriter, ScoreRef, &Element)) -> String {
        let s = ScoreRef::new(doc, 0).unwrap();
        let e = &s.score.elements[0];
        let mut xml = XmlWriter::new();
        f(&mut xml, s, e);
        xml.finish()
    }

    #[test]
    fn test_styled_property_is_never_written() {
        let e = Element::new(ElementData::Breath)
            .styled(Pid::MinDistance, Sid::FermataMinDistance)
            .with(Pid::MinDistance, PropertyValue::Spatium(5.0));
        let doc = doc_with(e);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::MinDistance));
        assert_eq!(out, "");
    }

    #[test]
    fn test_unstyled_override_is_written() {
        let e = Element::new(ElementData::Breath)
            .styled(Pid::MinDistance, Sid::FermataMinDistance)
            .with_flags(Pid::MinDistance, PropertyValue::Spatium(5.0), PropertyFlags::Unstyled);
        let doc = doc_with(e);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::MinDistance));
        assert_eq!(out, "<minDistance>5</minDistance>\n");
    }

    #[test]
    fn test_font_style_split_into_flags() {
        let e = Element::new(ElementData::Text { text: String::new() })
            .with(Pid::FontStyle, PropertyValue::Int(FontStyle::BOLD | FontStyle::UNDERLINE))
            .with_default(Pid::FontStyle, PropertyValue::Int(FontStyle::UNDERLINE | FontStyle::ITALIC));
        let doc = doc_with(e);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::FontStyle));
        assert_eq!(out, "<bold>1</bold>\n<italic>0</italic>\n");
    }

    #[test]
    fn test_offset_fuzzy_default() {
        let near = Element::new(ElementData::Breath).with(Pid::Offset, PropertyValue::Point(PointF::new(0.00005, 0.0)));
        let doc = doc_with(near);
        assert_eq!(write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::Offset)), "");
    }

    fn parsed_real(out: &str, attr: Option<&str>) -> f64 {
        let doc = roxmltree::Document::parse(out).unwrap();
        let node = doc.root_element();
        let text = match attr {
            Some(a) => node.attribute(a),
            None => node.text(),
        };
        text.unwrap().parse().unwrap()
    }

    #[test]
    fn test_offset_just_beyond_tolerance_emitted() {
        let e = Element::new(ElementData::Breath)
            .with(Pid::Offset, PropertyValue::Point(PointF::new(0.0, FUZZ + 1e-6)));
        let doc = doc_with(e);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::Offset));
        assert!(out.starts_with("<offset "));
        assert_eq!(parsed_real(&out, Some("x")), 0.0);
        assert!(parsed_real(&out, Some("y")) > 0.0);
    }

    #[test]
    fn test_mm_within_tolerance_suppressed() {
        let near = Element::new(ElementData::Breath)
            .with_default(Pid::LineWidth, PropertyValue::Millimetre(2.48))
            .with(Pid::LineWidth, PropertyValue::Millimetre(2.48 + FUZZ / 2.0));
        let doc = doc_with(near);
        assert_eq!(write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::LineWidth)), "");

        let beyond = Element::new(ElementData::Breath)
            .with_default(Pid::LineWidth, PropertyValue::Millimetre(2.48))
            .with(Pid::LineWidth, PropertyValue::Millimetre(2.48 + FUZZ + 1e-6));
        let doc = doc_with(beyond);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::LineWidth));
        // written in spatium units
        assert!((parsed_real(&out, None) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_default_in_another_real_unit_is_not_written() {
        let e = Element::new(ElementData::Breath)
            .with_flags(Pid::MinDistance, PropertyValue::Real(0.0), PropertyFlags::Unstyled);
        let doc = doc_with(e);
        assert_eq!(write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::MinDistance)), "");
    }

    #[test]
    fn test_offset_scaled_by_spatium() {
        let e = Element::new(ElementData::Breath).with(Pid::Offset, PropertyValue::Point(PointF::new(24.8, -12.4)));
        let doc = doc_with(e);
        let out = write_one(&doc, |xml, s, e| write_property(xml, s, e, Pid::Offset));
        assert_eq!(out, "<offset x=\"1\" y=\"-0.5\"/>\n");
    }

    #[test]
    fn test_autoplace_written_against_enabled_baseline() {
        let e = Element::new(ElementData::Breath).with(Pid::Autoplace, PropertyValue::Bool(false));
        let doc = doc_with(e);
        doc.scores[0].style.set_autoplace_enabled(false);
        let mut ctx = WriteContext::new(WriteOptions::default());
        let out = write_one(&doc, |xml, s, e| write_item_properties(xml, &mut ctx, s, e));
        assert!(out.contains("<autoplace>0</autoplace>"));
        assert!(!doc.scores[0].style.autoplace_enabled());
    }

    #[test]
    fn test_autoplace_guard_restores_on_drop() {
        let style = Style::default();
        style.set_autoplace_enabled(false);
        {
            let _guard = AutoplaceOverride::enable(&style);
            assert!(style.autoplace_enabled());
        }
        assert!(!style.autoplace_enabled());
    }

    #[test]
    fn test_layer_tag_name() {
        let mut e = Element::new(ElementData::Breath);
        e.tag = 1 << 3;
        let mut score = Score::new(1);
        score.layer_tags[3] = "soloist".to_string();
        score.add(e);
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        let out = write_one(&doc, |xml, s, e| write_item_properties(xml, &mut ctx, s, e));
        assert!(out.contains("<tag>soloist</tag>"));
    }
}
