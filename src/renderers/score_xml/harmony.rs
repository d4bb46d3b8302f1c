//! Chord symbol writer

use crate::models::interval::transpose_tpc;
use crate::models::{Element, HarmonyData, NoteCaseType, Pid};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::properties::write_property;
use super::text::write_text_base_properties;

/// Leading marker the chord parser uses for minor chords
const MINOR_MARKER: char = '=';

pub fn write_harmony(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, h: &HarmonyData) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::HarmonyType);
    write_property(xml, s, e, Pid::Play);
    if h.left_paren {
        xml.tag_empty("leftParen");
    }

    if h.root_tpc.is_some() || h.base_tpc.is_some() {
        let (root, base) = written_tpcs(ctx, s, e, h);
        if let Some(root) = root {
            xml.tag("root", root);
            if h.root_case != NoteCaseType::Capital {
                xml.tag("rootCase", h.root_case as i32);
            }
        }
        if h.id > 0 {
            xml.tag("extension", h.id);
        }
        let name = write_name(h);
        if !name.is_empty() {
            xml.tag("name", name);
        }
        if let Some(base) = base {
            xml.tag("base", base);
            if h.base_case != NoteCaseType::Capital {
                xml.tag("baseCase", h.base_case as i32);
            }
        }
        for degree in &h.degrees {
            let Some(kind) = degree.kind.xml_name() else {
                continue;
            };
            xml.start_element("degree");
            xml.tag("degree-value", degree.value);
            xml.tag("degree-alter", degree.alter);
            xml.tag("degree-type", kind);
            xml.end_element();
        }
    } else {
        xml.tag("name", h.text_name.as_str());
    }

    if !h.function.is_empty() {
        xml.tag("function", h.function.as_str());
    }
    write_text_base_properties(xml, ctx, s, e, None);
    if h.right_paren {
        xml.tag_empty("rightParen");
    }
    xml.end_element();
}

/// Root and base as written; copies out of a transposed view carry the
/// instrument transposition
fn written_tpcs(ctx: &WriteContext, s: ScoreRef, e: &Element, h: &HarmonyData) -> (Option<i32>, Option<i32>) {
    let (mut root, mut base) = (h.root_tpc, h.base_tpc);
    // symbols on a fret diagram have no segment and use the initial instrument
    if let Some(staff) = e.track.and_then(|t| s.score.staff_for_track(t)) {
        let interval = staff.transpose_at(h.segment_tick);
        if ctx.clipboard_mode() && !s.style().concert_pitch && interval.chromatic != 0 {
            root = root.map(|t| transpose_tpc(t, interval, true));
            base = base.map(|t| transpose_tpc(t, interval, true));
        }
    }
    (root, base)
}

/// Cached name, with the minor marker restored if the parser had one
fn write_name(h: &HarmonyData) -> String {
    let parsed_minor = h
        .parsed_name
        .as_deref()
        .is_some_and(|p| p.starts_with(MINOR_MARKER));
    if parsed_minor && !h.text_name.starts_with(MINOR_MARKER) {
        format!("{}{}", MINOR_MARKER, h.text_name)
    } else {
        h.text_name.clone()
    }
}
