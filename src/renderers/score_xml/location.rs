//! Element positions, absolute or relative to another position
//!
//! Links and slur endpoints refer to other elements by where they are
//! rather than by id. A relative location is the field-wise difference
//! against a reference, so nearby targets encode as a few small numbers.

use crate::models::{Element, ElementData, Fraction, FractionOverflow, VOICES};

use super::builder::XmlWriter;
use super::context::ScoreRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub staff: i32,
    pub voice: i32,
    pub measure: i32,
    /// Tick inside the measure, or absolute tick with measure 0
    pub frac: Fraction,
    pub grace: i32,
    pub note: i32,
    pub rel: bool,
}

impl Location {
    /// Position of an element, with an absolute tick
    pub fn position_for_element<'a>(s: ScoreRef<'a>, element: &'a Element) -> Location {
        Self::fill(s, element, true)
    }

    /// Position of an element as measure index plus measure-relative tick
    pub fn for_element<'a>(s: ScoreRef<'a>, element: &'a Element) -> Location {
        Self::fill(s, element, false)
    }

    fn fill<'a>(s: ScoreRef<'a>, element: &'a Element, absfrac: bool) -> Location {
        let mut loc = Location::default();
        let mut anchor = element;

        // notes are addressed through their chord
        if let ElementData::Note(_) = &element.data {
            if let Some(chord) = element.parent.and_then(|p| s.element(p)) {
                if let Some(c) = chord.data.chord() {
                    loc.note = c.notes.iter().position(|n| *n == element.id).unwrap_or(0) as i32;
                }
                anchor = chord;
            }
        }
        // grace chords through the chord they are attached to
        if let ElementData::Chord(c) = &anchor.data {
            if c.is_grace() {
                if let Some(main) = anchor.parent.and_then(|p| s.element(p)) {
                    if let Some(mc) = main.data.chord() {
                        loc.grace = mc.grace_notes.iter().position(|g| *g == anchor.id).unwrap_or(0) as i32;
                    }
                    anchor = main;
                }
            }
        }

        let track = anchor.track.or(element.track).unwrap_or(0);
        loc.staff = (track / VOICES) as i32;
        loc.voice = (track % VOICES) as i32;
        if absfrac {
            loc.frac = anchor.tick;
        } else if let Some(m) = s.score.tick2measure(anchor.tick) {
            loc.measure = m as i32;
            loc.frac = anchor.tick - s.score.measures[m].tick;
        } else {
            loc.frac = anchor.tick;
        }
        loc
    }

    /// Express this location as a difference against `reference`
    pub fn to_relative(&mut self, reference: &Location) -> Result<(), FractionOverflow> {
        if self.rel {
            return Ok(());
        }
        self.frac = self.frac.checked_sub(reference.frac)?;
        self.staff -= reference.staff;
        self.voice -= reference.voice;
        self.measure -= reference.measure;
        self.grace -= reference.grace;
        self.note -= reference.note;
        self.rel = true;
        Ok(())
    }

    pub fn write(&self, xml: &mut XmlWriter) {
        xml.start_element("location");
        xml.tag_default("staves", self.staff, 0);
        xml.tag_default("voices", self.voice, 0);
        xml.tag_default("measures", self.measure, 0);
        xml.tag_fraction("fractions", self.frac, Some(Fraction::zero()));
        xml.tag_default("grace", self.grace, 0);
        xml.tag_default("notes", self.note, 0);
        xml.end_element();
    }
}
