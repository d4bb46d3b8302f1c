//! Chords, rests and the objects a chord owns
//!
//! Writing a chord-rest advances the tick cursor. Slur start and end tags
//! are looked up around the tick the chord-rest started at, so the writer
//! has to run in document order.

use crate::models::{
    BeamMode, ChordData, ChordRestData, Element, ElementData, Fraction, HookData, Pid, TremoloChordType,
};

use super::beam::write_beam;
use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::lines::{write_slur_end, write_slur_start};
use super::properties::{write_item_properties, write_property};
use super::text::write_text_base_properties;

/// Write the beam a chord-rest starts, unless layout will regenerate it
pub fn write_chord_rest_beam(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, cr: &ChordRestData) {
    let Some(beam) = cr.beam.and_then(|id| s.element(id)) else {
        return;
    };
    let ElementData::Beam(data) = &beam.data else {
        return;
    };
    if data.elements.first() == Some(&e.id) && (ctx.test_mode() || !beam.generated) {
        write_beam(xml, ctx, s, beam, data);
    }
}

/// Properties shared by chords and rests
pub fn write_chord_rest_properties(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, cr: &ChordRestData) {
    write_item_properties(xml, ctx, s, e);

    let (is_rest, is_grace) = match &e.data {
        ElementData::Rest(_) => (true, false),
        ElementData::Chord(c) => (false, c.is_grace()),
        _ => (false, false),
    };
    let default_mode = if is_rest { BeamMode::None } else { BeamMode::Auto };
    if cr.beam_mode != default_mode {
        xml.tag("BeamMode", cr.beam_mode.xml_name());
    }
    write_property(xml, s, e, Pid::Small);
    if cr.dots > 0 {
        xml.tag("dots", cr.dots as i32);
    }
    write_property(xml, s, e, Pid::StaffMove);

    if cr.duration_type.is_valid() {
        xml.tag("durationType", cr.duration_type.xml_name());
    }
    if !cr.ticks.is_zero() && cr.duration_type.fraction(cr.dots) != Some(cr.ticks) {
        xml.tag_fraction("duration", cr.ticks, None);
    }

    for lyrics in s.elements(&cr.lyrics) {
        write_element(xml, ctx, s, lyrics);
    }

    let cur_tick = ctx.cur_tick().ticks();

    if !is_grace {
        let stretch = e
            .staff_idx()
            .and_then(|idx| s.score.staff(idx))
            .map(|staff| staff.stretch())
            .unwrap_or_else(Fraction::one);
        match cr.ticks.checked_div(stretch) {
            Ok(ticks) => ctx.inc_cur_tick(ticks),
            Err(err) => ctx.record_overflow(err),
        }
    }

    for id in s.score.find_overlapping(cur_tick.saturating_sub(1), cur_tick.saturating_add(1)) {
        let Some(spanner) = s.element(id) else {
            continue;
        };
        let ElementData::Slur(slur) = &spanner.data else {
            continue;
        };
        if spanner.generated || slur.broken || !ctx.can_write(spanner) {
            continue;
        }
        if slur.line.start_element == Some(e.id) {
            write_slur_start(xml, ctx, s, spanner, e);
        } else if slur.line.end_element == Some(e.id) {
            write_slur_end(xml, ctx, s, spanner, e);
        }
    }
}

pub fn write_chord(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, c: &ChordData) {
    for grace in s.elements(&c.grace_notes) {
        write_element(xml, ctx, s, grace);
    }
    write_chord_rest_beam(xml, ctx, s, e, &c.cr);

    xml.start_element(e.type_name());
    write_chord_rest_properties(xml, ctx, s, e, &c.cr);
    for articulation in s.elements(&c.articulations) {
        write_element(xml, ctx, s, articulation);
    }
    if let Some(marker) = c.note_type.marker() {
        xml.tag_empty(marker);
    }

    let style = s.style();
    if c.no_stem {
        xml.tag("noStem", true);
    } else if let Some(stem) = c.stem.and_then(|id| s.element(id)) {
        let user_len = stem.get_property(style, Pid::UserLen).map(|v| v.to_real()).unwrap_or(0.0);
        if stem.is_user_modified(style) || user_len != 0.0 {
            write_element(xml, ctx, s, stem);
        }
    }
    if let Some(hook) = c.hook.and_then(|id| s.element(id)) {
        if hook.is_user_modified(style) {
            write_element(xml, ctx, s, hook);
        }
    }
    if let Some(slash) = c.stem_slash.and_then(|id| s.element(id)) {
        if slash.is_user_modified(style) {
            write_element(xml, ctx, s, slash);
        }
    }
    write_property(xml, s, e, Pid::StemDirection);

    for note in s.elements(&c.notes) {
        write_element(xml, ctx, s, note);
    }
    if let Some(arpeggio) = c.arpeggio.and_then(|id| s.element(id)) {
        write_element(xml, ctx, s, arpeggio);
    }
    if c.tremolo_chord_type != TremoloChordType::TremoloSecondNote {
        if let Some(tremolo) = c.tremolo.and_then(|id| s.element(id)) {
            write_element(xml, ctx, s, tremolo);
        }
    }
    for child in s.elements(&e.children) {
        // note-attached chord lines are written by their note
        if let ElementData::ChordLine(cl) = &child.data {
            if cl.note.is_some() {
                continue;
            }
        }
        write_element(xml, ctx, s, child);
    }
    xml.end_element();
}

pub fn write_rest(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, cr: &ChordRestData) {
    write_chord_rest_beam(xml, ctx, s, e, cr);
    xml.start_element(e.type_name());
    write_chord_rest_properties(xml, ctx, s, e, cr);
    for child in s.elements(&e.children) {
        write_element(xml, ctx, s, child);
    }
    xml.end_element();
}

pub fn write_note(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, accidental: Option<&Element>) {
    xml.start_element(e.type_name());
    write_item_properties(xml, ctx, s, e);
    if let Some(acc) = accidental {
        write_element(xml, ctx, s, acc);
    }
    for child in s.elements(&e.children) {
        write_element(xml, ctx, s, child);
    }
    // chord lines the chord left to this note
    if let Some(chord) = e.parent.and_then(|p| s.element(p)) {
        for child in s.elements(&chord.children) {
            if matches!(&child.data, ElementData::ChordLine(cl) if cl.note == Some(e.id)) {
                write_element(xml, ctx, s, child);
            }
        }
    }
    write_property(xml, s, e, Pid::Pitch);
    write_property(xml, s, e, Pid::Tpc1);
    let style = s.style();
    let tpc1 = e.get_property(style, Pid::Tpc1);
    let tpc2 = e.get_property(style, Pid::Tpc2);
    if let Some(tpc2) = tpc2 {
        if Some(&tpc2) != tpc1.as_ref() {
            xml.tag("tpc2", tpc2.to_int());
        }
    }
    xml.end_element();
}

pub fn write_stem(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    xml.start_element(e.type_name());
    write_item_properties(xml, ctx, s, e);
    write_property(xml, s, e, Pid::UserLen);
    xml.end_element();
}

pub fn write_stem_slash(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    xml.start_element(e.type_name());
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_hook(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, hook: &HookData) {
    xml.start_element(e.type_name());
    xml.tag("name", hook.sym_name.as_str());
    if let Some(font) = &hook.font {
        xml.tag("font", font.as_str());
    }
    // symbol block: leaf symbols, then the item block
    for leaf in s.elements(&e.children) {
        write_element(xml, ctx, s, leaf);
    }
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_tremolo(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::TremoloType);
    write_item_properties(xml, ctx, s, e);
    xml.end_element();
}

pub fn write_lyrics(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, text: &str) {
    xml.start_element(e.type_name());
    write_property(xml, s, e, Pid::Verse);
    write_property(xml, s, e, Pid::Syllabic);
    write_property(xml, s, e, Pid::LyricTicks);
    write_text_base_properties(xml, ctx, s, e, Some(text));
    xml.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::models::{
        ChordRestData, Document, DurationType, ElementId, NoteData, NoteType, PropertyValue, Score,
    };

    fn quarter() -> ChordData {
        ChordData::new(ChordRestData::new(DurationType::Quarter, 0))
    }

    fn write_first(doc: &Document, ctx: &mut WriteContext) -> String {
        let s = ScoreRef::new(doc, 0).unwrap();
        let mut xml = XmlWriter::new();
        write_element(&mut xml, ctx, s, &s.score.elements[0]);
        xml.finish()
    }

    #[test]
    fn test_chord_advances_cursor() {
        let mut score = Score::new(1);
        score.add(Element::new(ElementData::Chord(quarter())).at(0, Fraction::zero()));
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_track(Some(0));
        let out = write_first(&doc, &mut ctx);
        assert!(out.contains("<durationType>quarter</durationType>"));
        assert!(!out.contains("<duration>"));
        assert!(!out.contains("<track>"));
        assert_eq!(ctx.cur_tick(), Fraction::new(1, 4));
    }

    #[test]
    fn test_rest_beam_mode_default_differs_from_chord() {
        let mut score = Score::new(1);
        let mut cr = ChordRestData::new(DurationType::Eighth, 0);
        cr.beam_mode = BeamMode::None;
        score.add(Element::new(ElementData::Rest(cr.clone())).at(0, Fraction::zero()));
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        assert!(!write_first(&doc, &mut ctx).contains("BeamMode"));

        let mut score = Score::new(1);
        score.add(Element::new(ElementData::Chord(ChordData::new(cr))).at(0, Fraction::zero()));
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        assert!(write_first(&doc, &mut ctx).contains("<BeamMode>no</BeamMode>"));
    }

    #[test]
    fn test_tuplet_duration_written() {
        let mut cr = ChordRestData::new(DurationType::Eighth, 0);
        cr.ticks = Fraction::new(1, 12);
        let mut score = Score::new(1);
        score.add(Element::new(ElementData::Rest(cr)).at(0, Fraction::zero()));
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        assert!(write_first(&doc, &mut ctx).contains("<duration>1/12</duration>"));
    }

    #[test]
    fn test_grace_notes_precede_chord_and_keep_cursor() {
        let mut score = Score::new(1);
        let mut main = quarter();
        main.grace_notes.push(ElementId(1));
        score.add(Element::new(ElementData::Chord(main)).at(0, Fraction::zero()));
        let mut grace = ChordData::new(ChordRestData::new(DurationType::Eighth, 0));
        grace.note_type = NoteType::Acciaccatura;
        let mut g = Element::new(ElementData::Chord(grace)).at(0, Fraction::zero());
        g.parent = Some(ElementId(0));
        score.add(g);
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_track(Some(0));
        let out = write_first(&doc, &mut ctx);
        let grace_pos = out.find("<acciaccatura/>").unwrap();
        let quarter_pos = out.find("<durationType>quarter</durationType>").unwrap();
        assert!(grace_pos < quarter_pos);
        assert_eq!(ctx.cur_tick(), Fraction::new(1, 4));
    }

    #[test]
    fn test_unmodified_stem_is_elided() {
        let mut score = Score::new(1);
        let mut c = quarter();
        c.stem = Some(ElementId(1));
        c.notes.push(ElementId(2));
        score.add(Element::new(ElementData::Chord(c)).at(0, Fraction::zero()));
        score.add(Element::new(ElementData::Stem).at(0, Fraction::zero()));
        let mut note = Element::new(ElementData::Note(NoteData::default()))
            .at(0, Fraction::zero())
            .with(Pid::Pitch, PropertyValue::Int(60))
            .with(Pid::Tpc1, PropertyValue::Int(14))
            .with(Pid::Tpc2, PropertyValue::Int(14));
        note.parent = Some(ElementId(0));
        score.add(note);
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_track(Some(0));
        let out = write_first(&doc, &mut ctx);
        assert!(!out.contains("<Stem>"));
        assert!(out.contains("<pitch>60</pitch>"));
        assert!(out.contains("<tpc>14</tpc>"));
        assert!(!out.contains("<tpc2>"));
    }

    #[test]
    fn test_stem_with_user_length_is_written() {
        let mut score = Score::new(1);
        let mut c = quarter();
        c.stem = Some(ElementId(1));
        score.add(Element::new(ElementData::Chord(c)).at(0, Fraction::zero()));
        score.add(
            Element::new(ElementData::Stem)
                .at(0, Fraction::zero())
                .with(Pid::UserLen, PropertyValue::Millimetre(12.4)),
        );
        let doc = Document::new(score);
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_track(Some(0));
        let out = write_first(&doc, &mut ctx);
        assert!(out.contains("<Stem>"));
        assert!(out.contains("<userLen>0.5</userLen>"));
    }
}
