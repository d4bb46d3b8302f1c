//! Element dispatch
//!
//! One exhaustive match from element kind to writer. Every writer that
//! writes children goes back through [`write_element`].

use crate::models::{Element, ElementData};

use super::builder::XmlWriter;
use super::chord::{write_chord, write_hook, write_lyrics, write_note, write_rest, write_stem, write_stem_slash, write_tremolo};
use super::context::{ScoreRef, WriteContext};
use super::fret::write_fret_diagram;
use super::harmony::write_harmony;
use super::items::{
    write_accidental, write_action_icon, write_ambitus, write_arpeggio, write_articulation, write_bagpipe_embellishment,
    write_bar_line, write_bend, write_box, write_bracket, write_breath, write_chord_line, write_clef, write_fermata,
};
use super::lines::{write_glissando, write_gradual_tempo_change, write_hairpin, write_slur};
use super::text::{write_dynamic, write_figured_bass, write_figured_bass_item, write_fingering, write_text};

pub fn write_element(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    match &e.data {
        ElementData::Accidental => write_accidental(xml, ctx, s, e),
        ElementData::ActionIcon(a) => write_action_icon(xml, e, a),
        ElementData::Ambitus(a) => write_ambitus(xml, ctx, s, e, a),
        ElementData::Arpeggio(a) => write_arpeggio(xml, ctx, s, e, a),
        ElementData::Articulation(a) => write_articulation(xml, ctx, s, e, a),
        ElementData::BagpipeEmbellishment { embel_type } => write_bagpipe_embellishment(xml, e, embel_type),
        ElementData::BarLine => write_bar_line(xml, ctx, s, e),
        // written by their first chord-rest
        ElementData::Beam(_) => log::debug!("beam {:?} reached through dispatch, skipped", e.id),
        ElementData::Bend(b) => write_bend(xml, ctx, s, e, b),
        ElementData::Box(b) => write_box(xml, ctx, s, e, b),
        ElementData::Bracket(b) => write_bracket(xml, ctx, s, e, b),
        ElementData::Breath => write_breath(xml, ctx, s, e),
        ElementData::Chord(c) => write_chord(xml, ctx, s, e, c),
        ElementData::ChordLine(c) => write_chord_line(xml, ctx, s, e, c),
        ElementData::Clef(c) => write_clef(xml, ctx, s, e, c),
        ElementData::Dynamic(d) => write_dynamic(xml, ctx, s, e, d),
        ElementData::Fermata { sym_name } => write_fermata(xml, ctx, s, e, sym_name),
        ElementData::FiguredBass(f) => write_figured_bass(xml, ctx, s, e, f),
        ElementData::FiguredBassItem(f) => write_figured_bass_item(xml, e, f),
        ElementData::Fingering { text } => write_fingering(xml, ctx, s, e, text),
        ElementData::FretDiagram(fd) => write_fret_diagram(xml, ctx, s, e, fd),
        ElementData::Glissando(g) => write_glissando(xml, ctx, s, e, g),
        ElementData::GradualTempoChange(l) => write_gradual_tempo_change(xml, ctx, s, e, l),
        ElementData::Hairpin(h) => write_hairpin(xml, ctx, s, e, h),
        ElementData::Harmony(h) => write_harmony(xml, ctx, s, e, h),
        ElementData::Hook(h) => write_hook(xml, ctx, s, e, h),
        ElementData::Lyrics { text } => write_lyrics(xml, ctx, s, e, text),
        ElementData::Note(n) => {
            let accidental = n.accidental.and_then(|id| s.element(id));
            write_note(xml, ctx, s, e, accidental)
        }
        ElementData::Rest(cr) => write_rest(xml, ctx, s, e, cr),
        ElementData::Slur(slur) => write_slur(xml, ctx, s, e, &slur.line),
        // segments are written by their line
        ElementData::LineSegment(_) => log::debug!("line segment {:?} outside its spanner, skipped", e.id),
        ElementData::Stem => write_stem(xml, ctx, s, e),
        ElementData::StemSlash => write_stem_slash(xml, ctx, s, e),
        ElementData::Text { text } => write_text(xml, ctx, s, e, text),
        ElementData::Tremolo => write_tremolo(xml, ctx, s, e),
    }
}
