//! Fixture documents shared by the integration tests
#![allow(dead_code)]

use score_writer_wasm::models::{
    ChordData, ChordRestData, DurationType, Element, ElementData, ElementId, Fraction, Measure, NoteData, Pid,
    PropertyValue, Score,
};

/// `staves` staves and `measures` consecutive 4/4 measures
pub fn score(staves: usize, measures: usize) -> Score {
    let mut score = Score::new(staves);
    for m in 0..measures {
        score.measures.push(Measure::new(Fraction::new(m as i32, 1), Fraction::one()));
    }
    score
}

pub fn quarter_chord(track: usize, tick: Fraction) -> Element {
    Element::new(ElementData::Chord(ChordData::new(ChordRestData::new(DurationType::Quarter, 0)))).at(track, tick)
}

/// Add a quarter chord with one note and place it in its measure
pub fn add_chord(score: &mut Score, track: usize, tick: Fraction, pitch: i32) -> ElementId {
    let chord = score.add(quarter_chord(track, tick));
    let note = score.add(
        Element::new(ElementData::Note(NoteData::default()))
            .at(track, tick)
            .with(Pid::Pitch, PropertyValue::Int(pitch))
            .with(Pid::Tpc1, PropertyValue::Int(14)),
    );
    score.elements[note.0].parent = Some(chord);
    if let ElementData::Chord(c) = &mut score.elements[chord.0].data {
        c.notes.push(note);
    }
    place(score, track, tick, chord);
    chord
}

/// Append an element to the voice list of the measure holding `tick`
pub fn place(score: &mut Score, track: usize, tick: Fraction, id: ElementId) {
    let m = score.tick2measure(tick).expect("tick outside the fixture");
    score.place(m, track, id);
}

pub fn parse(xml: &str) -> roxmltree::Document<'_> {
    roxmltree::Document::parse(xml).expect("emitted markup is well-formed")
}

/// Text of the first descendant named `name` under `node`
pub fn child_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children().find(|n| n.has_tag_name(name)).and_then(|n| n.text())
}
