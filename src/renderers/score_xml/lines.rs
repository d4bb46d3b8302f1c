//! Spanners: line elements, their segments, and spanner start/end markers
//!
//! A line spanner writes its segments only when one of them was moved,
//! hidden or otherwise taken out of automatic placement; an untouched line
//! is fully re-derived from style on load.

use crate::models::{
    Element, ElementData, Fraction, GlissandoData, HairpinData, Pid, PropertyFlags, SegmentData, SpannerData, VOICES,
};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::location::Location;
use super::properties::{write_item_properties, write_property, write_styled_properties, write_unstyled_properties};

/// Text line properties that are written unless styled
const TEXT_LINE_BASE_PIDS: [Pid; 14] = [
    Pid::LineVisible,
    Pid::BeginHookType,
    Pid::BeginHookHeight,
    Pid::EndHookType,
    Pid::EndHookHeight,
    Pid::BeginText,
    Pid::BeginTextPlace,
    Pid::BeginFontFace,
    Pid::BeginFontSize,
    Pid::BeginFontStyle,
    Pid::BeginTextOffset,
    Pid::ContinueText,
    Pid::ContinueTextPlace,
    Pid::EndText,
];

/// Common spanner block; clipboard copies carry their length explicitly
pub fn write_spanner_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, line: &SpannerData) {
    if ctx.clipboard_mode() {
        xml.tag_fraction("ticks_f", line.ticks, None);
    }
    write_item_properties(xml, ctx, s, e);
}

fn segment_modified(s: ScoreRef, seg: &Element, data: &SegmentData) -> bool {
    let style = s.style();
    !seg.autoplace(style)
        || !seg.visible(style)
        || seg.property_flags(Pid::MinDistance) == PropertyFlags::Unstyled
        || seg.get_property(style, Pid::MinDistance) != seg.property_default(style, Pid::MinDistance)
        || (!seg.is_styled(Pid::Offset) && (!seg.offset(style).is_null() || !data.user_off2.is_null()))
}

pub fn write_sline_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, line: &SpannerData) {
    if line.end_element.is_none() {
        // anchor lost somewhere upstream; resolve it from the end tick
        let end = s.score.compute_end_element(e);
        log::debug!("{}: end element missing, recomputed {:?}", e.type_name(), end);
        if end.is_none() {
            xml.tag_fraction("ticks", line.ticks, None);
        }
    }
    write_spanner_properties(xml, ctx, s, e, line);
    if line.diagonal {
        xml.tag("diagonal", true);
    }
    for pid in [Pid::LineWidth, Pid::LineStyle, Pid::Color, Pid::Anchor, Pid::DashLineLen, Pid::DashGapLen] {
        write_property(xml, s, e, pid);
    }

    let segments: Vec<(&Element, &SegmentData)> = s
        .elements(&line.segments)
        .filter_map(|seg| match &seg.data {
            ElementData::LineSegment(d) => Some((seg, d)),
            _ => None,
        })
        .collect();

    if s.score.is_palette {
        // palette cells only need a drawing length
        match segments.first() {
            Some((_, d)) => xml.tag("length", d.pos2.x),
            None => xml.tag("length", s.spatium() * 4.0),
        }
        return;
    }

    if !segments.iter().any(|(seg, d)| segment_modified(s, seg, d)) {
        return;
    }

    let spatium = s.spatium();
    let style = s.style();
    for (seg, d) in segments {
        xml.start_element("Segment");
        xml.tag("subtype", d.segment_type);
        xml.tag_point("offset", seg.offset(style) / spatium);
        xml.tag_point("off2", d.user_off2 / spatium);
        write_property(xml, s, seg, Pid::MinDistance);
        write_item_properties(xml, ctx, s, seg);
        xml.end_element();
    }
}

pub fn write_text_line_base_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, line: &SpannerData) {
    for pid in TEXT_LINE_BASE_PIDS {
        if !e.is_styled(pid) {
            write_property(xml, s, e, pid);
        }
    }
    write_sline_properties(xml, ctx, s, e, line);
}

pub fn write_glissando(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, g: &GlissandoData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    if g.show_text && !g.text.is_empty() {
        xml.tag("text", g.text.as_str());
    }
    for pid in [Pid::GlissType, Pid::Play, Pid::GlissStyle, Pid::GlissEaseIn, Pid::GlissEaseOut] {
        write_property(xml, s, e, pid);
    }
    write_styled_properties(xml, s, e);
    write_sline_properties(xml, ctx, s, e, &g.line);
    xml.end_element();
}

pub fn write_gradual_tempo_change(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, line: &SpannerData) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::TempoChangeType);
    write_property(xml, s, e, Pid::TempoEasingMethod);
    write_property(xml, s, e, Pid::TempoChangeFactor);
    write_property(xml, s, e, Pid::Placement);
    write_text_line_base_properties(xml, ctx, s, e, line);
    xml.end_element();
}

pub fn write_hairpin(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, h: &HairpinData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    xml.tag("subtype", h.hairpin_type);
    for pid in [
        Pid::VeloChange,
        Pid::HairpinCircledTip,
        Pid::DynamicRange,
        Pid::EndText,
        Pid::LineVisible,
        Pid::SingleNoteDynamics,
        Pid::VeloChangeMethod,
    ] {
        write_property(xml, s, e, pid);
    }
    write_unstyled_properties(xml, s, e);
    write_sline_properties(xml, ctx, s, e, &h.line);
    xml.end_element();
}

/// Slur body, written inside its `Spanner` marker
pub fn write_slur(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, line: &SpannerData) {
    xml.start_element(e.type_name());
    write_spanner_properties(xml, ctx, s, e, line);
    write_property(xml, s, e, Pid::SlurDirection);
    write_property(xml, s, e, Pid::LineStyle);
    xml.end_element();
}

/// Location of a spanner endpoint; clipboard content is measure-less
fn endpoint_location(s: ScoreRef, track: usize, tick: Fraction, clipboard: bool) -> Location {
    let mut loc = Location {
        staff: (track / VOICES) as i32,
        voice: (track % VOICES) as i32,
        ..Location::default()
    };
    match s.score.tick2measure(tick) {
        Some(m) if !clipboard => {
            loc.measure = m as i32;
            loc.frac = tick - s.score.measures[m].tick;
        }
        _ => loc.frac = tick,
    }
    loc
}

fn spanner_span(spanner: &Element) -> Option<(usize, Fraction, usize, Fraction)> {
    let line = spanner.data.spanner()?;
    let track = spanner.track?;
    let track2 = line.track2.unwrap_or(track);
    Some((track, spanner.tick, track2, spanner.tick + line.ticks))
}

/// `Spanner` marker opening a spanner: body plus where it ends
pub fn write_spanner_start(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, spanner: &Element) {
    let Some((track, tick, track2, end_tick)) = spanner_span(spanner) else {
        return;
    };
    xml.start_element_with("Spanner", &[("type", spanner.type_name().to_string())]);
    write_element(xml, ctx, s, spanner);
    let clipboard = ctx.clipboard_mode();
    let mut next = endpoint_location(s, track2, end_tick, clipboard);
    if let Err(err) = next.to_relative(&endpoint_location(s, track, tick, clipboard)) {
        ctx.record_overflow(err);
    }
    xml.start_element("next");
    next.write(xml);
    xml.end_element();
    xml.end_element();
}

/// `Spanner` marker closing a spanner: where it started
pub fn write_spanner_end(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, spanner: &Element) {
    let Some((track, tick, track2, end_tick)) = spanner_span(spanner) else {
        return;
    };
    xml.start_element_with("Spanner", &[("type", spanner.type_name().to_string())]);
    let clipboard = ctx.clipboard_mode();
    let mut prev = endpoint_location(s, track, tick, clipboard);
    if let Err(err) = prev.to_relative(&endpoint_location(s, track2, end_tick, clipboard)) {
        ctx.record_overflow(err);
    }
    xml.start_element("prev");
    prev.write(xml);
    xml.end_element();
    xml.end_element();
}

pub fn write_slur_start(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, slur: &Element, _start: &Element) {
    if ctx.mark_spanner_written(s.idx, slur.id) {
        write_spanner_start(xml, ctx, s, slur);
    }
}

pub fn write_slur_end(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, slur: &Element, _end: &Element) {
    if ctx.can_close_spanner(s.idx, slur.id) {
        write_spanner_end(xml, ctx, s, slur);
    }
}
