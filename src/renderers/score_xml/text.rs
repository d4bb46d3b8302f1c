//! Text-based elements
//!
//! Every text element shares one block: the item properties, its text
//! style, overridden styled properties, the text-style property list and,
//! when asked for, the raw rich text.

use crate::models::{
    DynamicData, Element, FiguredBassData, FiguredBassItemData, Fraction, Pid, PropertyValue,
};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::properties::{write_item_properties, write_property, write_styled_properties, write_unstyled_properties};

/// Properties a text style defines, in write order
const TEXT_STYLE_PIDS: [Pid; 14] = [
    Pid::FontFace,
    Pid::FontSize,
    Pid::LineSpacing,
    Pid::SizeSpatiumDependent,
    Pid::FontStyle,
    Pid::Color,
    Pid::Align,
    Pid::Offset,
    Pid::FrameType,
    Pid::FramePadding,
    Pid::FrameWidth,
    Pid::FrameRound,
    Pid::FrameFgColor,
    Pid::FrameBgColor,
];

const UNDEFINED_FONT_SIZE: f64 = -1.0;
const UNDEFINED_FONT_FAMILY: &str = "Undefined";

fn is_undefined(e: &Element, s: ScoreRef, pid: Pid) -> bool {
    let value = e.get_property(s.style(), pid);
    match (pid, value) {
        (Pid::FontSize, Some(v)) => v.to_real() == UNDEFINED_FONT_SIZE,
        (Pid::FontFace, Some(PropertyValue::String(face))) => face == UNDEFINED_FONT_FAMILY,
        _ => false,
    }
}

pub fn write_text_base_properties(
    xml: &mut XmlWriter,
    ctx: &mut WriteContext,
    s: ScoreRef,
    e: &Element,
    text: Option<&str>,
) {
    write_item_properties(xml, ctx, s, e);
    write_property(xml, s, e, Pid::TextStyle);
    write_unstyled_properties(xml, s, e);
    for pid in TEXT_STYLE_PIDS {
        if e.is_styled(pid) || is_undefined(e, s, pid) {
            continue;
        }
        write_property(xml, s, e, pid);
    }
    if let Some(text) = text {
        xml.write_xml("text", text);
    }
}

pub fn write_text(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, text: &str) {
    xml.start_element(e.type_name());
    write_text_base_properties(xml, ctx, s, e, Some(text));
    xml.end_element();
}

pub fn write_dynamic(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, d: &DynamicData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::DynamicType);
    write_property(xml, s, e, Pid::Velocity);
    write_property(xml, s, e, Pid::DynamicRange);
    if d.velocity_change_available {
        write_property(xml, s, e, Pid::VeloChange);
        write_property(xml, s, e, Pid::VeloChangeSpeed);
    }
    // standard dynamics regenerate their text from the type
    let is_other = e
        .get_property(s.style(), Pid::DynamicType)
        .is_some_and(|t| t.as_str() == Some("other"));
    write_text_base_properties(xml, ctx, s, e, is_other.then_some(d.text.as_str()));
    xml.end_element();
}

pub fn write_fingering(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, text: &str) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    write_text_base_properties(xml, ctx, s, e, Some(text));
    xml.end_element();
}

pub fn write_figured_bass(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, f: &FiguredBassData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    if !f.on_note {
        xml.tag("onNote", false);
    }
    if !f.ticks.is_zero() {
        xml.tag_fraction("ticks", f.ticks, Some(Fraction::zero()));
    }
    if f.items.is_empty() {
        // figures could not be parsed: keep the full text
        write_text_base_properties(xml, ctx, s, e, Some(&f.text));
    } else {
        for item in s.elements(&f.items) {
            write_element(xml, ctx, s, item);
        }
        write_styled_properties(xml, s, e);
        write_item_properties(xml, ctx, s, e);
    }
    xml.end_element();
}

pub fn write_figured_bass_item(xml: &mut XmlWriter, e: &Element, f: &FiguredBassItemData) {
    xml.start_element(e.type_name());
    let brackets: Vec<(&str, String)> = ["b0", "b1", "b2", "b3", "b4"]
        .into_iter()
        .zip(f.parens.iter())
        .map(|(name, p)| (name, p.to_string()))
        .collect();
    xml.tag_empty_with("brackets", &brackets);
    if f.prefix != FiguredBassItemData::MODIFIER_NONE {
        xml.tag("prefix", f.prefix);
    }
    if f.digit != FiguredBassItemData::DIGIT_NONE {
        xml.tag("digit", f.digit);
    }
    if f.suffix != FiguredBassItemData::MODIFIER_NONE {
        xml.tag("suffix", f.suffix);
    }
    if f.cont_line != FiguredBassItemData::CONT_LINE_NONE {
        xml.tag("continuationLine", f.cont_line);
    }
    xml.end_element();
}
