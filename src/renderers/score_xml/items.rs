//! Writers for the small self-contained items
//!
//! Ornaments, frames, clefs, barlines and the like. None of these touch the
//! tick cursor.

use crate::models::{
    ActionIconData, AmbitusData, ArpeggioData, ArticulationData, BendData, BoxData, BoxKind, BracketData,
    BracketType, ChordLineData, ClefData, Element, Groups, Pid, PropertyValue,
};

use super::builder::{XmlValue, XmlWriter};
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::properties::{write_item_properties, write_property, write_styled_properties};

const BOX_PIDS: [Pid; 9] = [
    Pid::BoxHeight,
    Pid::BoxWidth,
    Pid::TopGap,
    Pid::BottomGap,
    Pid::LeftMargin,
    Pid::RightMargin,
    Pid::TopMargin,
    Pid::BottomMargin,
    Pid::BoxAutosize,
];

pub fn write_accidental(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::AccidentalBracket);
    write_property(xml, s, e, Pid::AccidentalRole);
    write_property(xml, s, e, Pid::Small);
    write_property(xml, s, e, Pid::AccidentalType);
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_action_icon(xml: &mut XmlWriter, e: &Element, a: &ActionIconData) {
    xml.start_element(e.type_name());
    xml.tag("subtype", a.action_type);
    if !a.action_code.is_empty() {
        xml.tag("action", a.action_code.as_str());
    }
    xml.end_element();
}

fn has_accidental(s: ScoreRef, acc: &Element) -> bool {
    acc.get_property(s.style(), Pid::AccidentalType)
        .map(|v| v.as_str() != Some("none"))
        .unwrap_or(false)
}

pub fn write_ambitus(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, a: &AmbitusData) {
    xml.start_element(e.type_name());
    xml.tag_default(Pid::HeadGroup.xml_name(), a.head_group, AmbitusData::NOTEHEADGROUP_DEFAULT);
    xml.tag_default(Pid::HeadType.xml_name(), a.head_type, AmbitusData::NOTEHEADTYPE_DEFAULT);
    xml.tag_default(Pid::MirrorHead.xml_name(), a.direction, AmbitusData::DIR_DEFAULT);
    xml.tag_default("hasLine", a.has_line, true);
    xml.tag_property(
        Pid::LineWidthSpatium.xml_name(),
        &PropertyValue::Spatium(a.line_width),
        Some(&PropertyValue::Spatium(AmbitusData::LINEWIDTH_DEFAULT)),
    );
    xml.tag("topPitch", a.top_pitch);
    xml.tag("topTpc", a.top_tpc);
    xml.tag("bottomPitch", a.bottom_pitch);
    xml.tag("bottomTpc", a.bottom_tpc);
    for (tag, id) in [("topAccidental", a.top_accidental), ("bottomAccidental", a.bottom_accidental)] {
        let Some(acc) = id.and_then(|id| s.element(id)) else {
            continue;
        };
        if has_accidental(s, acc) {
            xml.start_element(tag);
            write_element(xml, ctx, s, acc);
            xml.end_element();
        }
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_arpeggio(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, a: &ArpeggioData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    write_item_properties(xml, ctx, s, e);
    write_property(xml, s, e, Pid::ArpeggioType);
    if a.user_len1 != 0.0 {
        xml.tag("userLen1", a.user_len1 / s.spatium());
    }
    if a.user_len2 != 0.0 {
        xml.tag("userLen2", a.user_len2 / s.spatium());
    }
    if a.span != 1 {
        xml.tag("span", a.span);
    }
    write_property(xml, s, e, Pid::Play);
    write_property(xml, s, e, Pid::TimeStretch);
    xml.end_element();
}

pub fn write_articulation(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, a: &ArticulationData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    if !a.channel_name.is_empty() {
        xml.tag_empty_with("channel", &[("name", a.channel_name.clone())]);
    }
    write_property(xml, s, e, Pid::Direction);
    match &a.text_type {
        Some(text_type) => xml.tag("subtype", text_type.as_str()),
        None => xml.tag("subtype", a.sym_name.as_str()),
    }
    write_property(xml, s, e, Pid::Play);
    write_property(xml, s, e, Pid::OrnamentStyle);
    write_styled_properties(xml, s, e);
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_bagpipe_embellishment(xml: &mut XmlWriter, e: &Element, embel_type: &str) {
    xml.start_element(e.type_name());
    xml.tag("subtype", embel_type);
    xml.end_element();
}

pub fn write_bar_line(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::BarlineType);
    write_property(xml, s, e, Pid::BarlineSpan);
    write_property(xml, s, e, Pid::BarlineSpanFrom);
    write_property(xml, s, e, Pid::BarlineSpanTo);
    for child in s.elements(&e.children) {
        write_element(xml, ctx, s, child);
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_bend(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, b: &BendData) {
    xml.start_element(e.type_name());
    for p in &b.points {
        xml.tag_empty_with(
            "point",
            &[
                ("time", p.time.to_string()),
                ("pitch", p.pitch.to_string()),
                ("vibrato", i32::from(p.vibrato).to_string()),
            ],
        );
    }
    write_styled_properties(xml, s, e);
    write_property(xml, s, e, Pid::Play);
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

fn write_box_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    for pid in BOX_PIDS {
        write_property(xml, s, e, pid);
    }
    write_item_properties(xml, ctx, s, e);
    for child in s.elements(&e.children) {
        write_element(xml, ctx, s, child);
    }
}

/// Frames: vertical, horizontal, fret and text boxes
pub fn write_box(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, b: &BoxData) {
    xml.start_element(e.type_name());
    if b.kind == BoxKind::HBox {
        write_property(xml, s, e, Pid::CreateSystemHeader);
    }
    write_box_properties(xml, ctx, s, e);
    if b.kind == BoxKind::TBox {
        if let Some(text) = b.text.and_then(|id| s.element(id)) {
            write_element(xml, ctx, s, text);
        }
    }
    xml.end_element();
}

pub fn write_bracket(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, b: &BracketData) {
    match b.bracket_type {
        BracketType::NoBracket => return,
        BracketType::Normal => xml.start_element(e.type_name()),
        other => xml.start_element_with(e.type_name(), &[("type", other.xml_name().to_string())]),
    }
    if b.column != 0 {
        xml.tag("level", b.column);
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_breath(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::Symbol);
    write_property(xml, s, e, Pid::Pause);
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_chord_line(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, c: &ChordLineData) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::ChordLineType);
    write_property(xml, s, e, Pid::ChordLineStraight);
    write_property(xml, s, e, Pid::ChordLineWavy);
    xml.tag_default("lengthX", c.length_x, 0.0);
    xml.tag_default("lengthY", c.length_y, 0.0);
    write_item_properties(xml, ctx, s, e);
    if c.modified {
        xml.start_element("Path");
        for p in &c.path {
            xml.tag_empty_with(
                "Element",
                &[("type", p.kind.to_string()), ("x", p.x.to_xml()), ("y", p.y.to_xml())],
            );
        }
        xml.end_element();
    }
    xml.end_element();
}

pub fn write_clef(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, c: &ClefData) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::ClefTypeConcert);
    write_property(xml, s, e, Pid::ClefTypeTransposing);
    if !c.show_courtesy {
        xml.tag("showCourtesyClef", false);
    }
    if c.for_instrument_change {
        xml.tag("forInstrumentChange", true);
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_fermata(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, sym_name: &str) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    xml.tag("subtype", sym_name);
    write_property(xml, s, e, Pid::TimeStretch);
    write_property(xml, s, e, Pid::Play);
    write_property(xml, s, e, Pid::MinDistance);
    if !e.is_styled(Pid::Offset) {
        write_property(xml, s, e, Pid::Offset);
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

/// Beam grouping of a staff's time signature
pub fn write_groups(xml: &mut XmlWriter, g: &Groups) {
    xml.start_element("Groups");
    for n in &g.nodes {
        xml.tag_empty_with("Node", &[("pos", n.pos.to_string()), ("action", n.action.to_string())]);
    }
    xml.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::models::{Document, ElementData, Fraction, GroupNode, PitchValue, Score, Sid};
    use pretty_assertions::assert_eq;

    fn write_one(score: Score, clipboard: bool) -> String {
        let doc = Document::new(score);
        let s = ScoreRef::new(&doc, 0).unwrap();
        let mut ctx = if clipboard {
            WriteContext::clipboard(WriteOptions::default())
        } else {
            WriteContext::new(WriteOptions::default())
        };
        ctx.set_cur_track(Some(0));
        let mut xml = XmlWriter::new();
        write_element(&mut xml, &mut ctx, s, &s.score.elements[0]);
        xml.finish()
    }

    fn single(e: Element) -> Score {
        let mut score = Score::new(1);
        score.add(e.at(0, Fraction::zero()));
        score
    }

    #[test]
    fn test_articulation_channel_and_subtype() {
        let art = Element::new(ElementData::Articulation(ArticulationData {
            channel_name: "pizz".to_string(),
            text_type: None,
            sym_name: "articStaccatoAbove".to_string(),
        }));
        let out = write_one(single(art), false);
        assert!(out.contains("<channel name=\"pizz\"/>"));
        assert!(out.contains("<subtype>articStaccatoAbove</subtype>"));
    }

    #[test]
    fn test_bracket_type_attribute() {
        let mut score = Score::new(1);
        score.add(Element::new(ElementData::Bracket(BracketData { bracket_type: BracketType::Brace, column: 1 })));
        let out = write_one(score, false);
        assert!(out.starts_with("<Bracket type=\"Brace\">"));
        assert!(out.contains("<level>1</level>"));

        let mut none = Score::new(1);
        none.add(Element::new(ElementData::Bracket(BracketData { bracket_type: BracketType::NoBracket, column: 0 })));
        assert_eq!(write_one(none, false), "");
    }

    #[test]
    fn test_hbox_writes_system_header_first() {
        let mut score = Score::new(1);
        score.add(
            Element::new(ElementData::Box(BoxData { kind: BoxKind::HBox, text: None }))
                .with(Pid::CreateSystemHeader, PropertyValue::Bool(false)),
        );
        let out = write_one(score, false);
        assert_eq!(out, "<HBox>\n  <createSystemHeader>0</createSystemHeader>\n</HBox>\n");
    }

    #[test]
    fn test_clef_courtesy_only_when_off() {
        let out = write_one(single(Element::new(ElementData::Clef(ClefData::default()))), false);
        assert!(!out.contains("showCourtesyClef"));
        let hidden = ClefData { show_courtesy: false, for_instrument_change: true };
        let out = write_one(single(Element::new(ElementData::Clef(hidden))), false);
        assert!(out.contains("<showCourtesyClef>0</showCourtesyClef>"));
        assert!(out.contains("<forInstrumentChange>1</forInstrumentChange>"));
    }

    #[test]
    fn test_breath_respects_clipboard_filter() {
        let mut score = single(Element::new(ElementData::Breath));
        score.elements[0].track = Some(1);
        let doc = Document::new(score);
        let s = ScoreRef::new(&doc, 0).unwrap();
        let options = WriteOptions {
            filter: crate::config::SelectionFilter { voices: vec![0], excluded_types: vec![] },
            ..Default::default()
        };
        let mut ctx = WriteContext::clipboard(options);
        let mut xml = XmlWriter::new();
        write_element(&mut xml, &mut ctx, s, &s.score.elements[0]);
        assert_eq!(xml.finish(), "");
    }

    #[test]
    fn test_bend_points() {
        let bend = Element::new(ElementData::Bend(BendData {
            points: vec![
                PitchValue { time: 0, pitch: 0, vibrato: false },
                PitchValue { time: 60, pitch: 100, vibrato: false },
            ],
        }))
        .styled(Pid::BendLineWidth, Sid::BendLineWidth);
        let out = write_one(single(bend), false);
        assert!(out.contains("<point time=\"60\" pitch=\"100\" vibrato=\"0\"/>"));
        assert!(!out.contains("lineWidth"));
    }

    #[test]
    fn test_groups_nodes() {
        let mut xml = XmlWriter::new();
        write_groups(&mut xml, &Groups { nodes: vec![GroupNode { pos: 8, action: 0x11 }] });
        assert_eq!(xml.finish(), "<Groups>\n  <Node pos=\"8\" action=\"17\"/>\n</Groups>\n");
    }

    #[test]
    fn test_ambitus_defaults_elided() {
        let ambitus = AmbitusData {
            head_group: AmbitusData::NOTEHEADGROUP_DEFAULT,
            head_type: AmbitusData::NOTEHEADTYPE_DEFAULT,
            direction: AmbitusData::DIR_DEFAULT,
            has_line: true,
            line_width: AmbitusData::LINEWIDTH_DEFAULT,
            top_pitch: 72,
            top_tpc: 14,
            bottom_pitch: 60,
            bottom_tpc: 14,
            top_accidental: None,
            bottom_accidental: None,
        };
        let out = write_one(single(Element::new(ElementData::Ambitus(ambitus))), false);
        assert!(!out.contains("hasLine"));
        assert!(!out.contains("lineWidth"));
        assert!(out.contains("<topPitch>72</topPitch>"));
    }
}
