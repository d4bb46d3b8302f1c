//! Clipboard copies of a staff and tick range

mod common;

use common::{add_chord, child_text, parse, place, score};
use score_writer_wasm::models::{
    Document, Element, ElementData, ElementRef, ElementType, Fraction, HairpinData, HarmonyData, Interval, Lid,
    Score, SpannerData,
};
use score_writer_wasm::{copy_selection, write_document, SelectionFilter, WriteOptions};

fn bar() -> (Fraction, Fraction) {
    (Fraction::zero(), Fraction::one())
}

/// Bb instrument with one C chord symbol at the start
fn harmony_score(concert_pitch: bool) -> Score {
    let mut score = score(1, 1);
    score.staves[0].transpose = Interval::new(-1, -2);
    score.style.concert_pitch = concert_pitch;
    let h = score.add(
        Element::new(ElementData::Harmony(HarmonyData {
            root_tpc: Some(14),
            text_name: "7".to_string(),
            segment_tick: Some(Fraction::zero()),
            ..Default::default()
        }))
        .at(0, Fraction::zero()),
    );
    place(&mut score, 0, Fraction::zero(), h);
    score
}

fn root_of(out: &str) -> String {
    let doc = parse(out);
    let harmony = doc.descendants().find(|n| n.has_tag_name("Harmony")).unwrap();
    child_text(harmony, "root").unwrap().to_string()
}

#[test]
fn test_harmony_transposed_in_copy() {
    let doc = Document::new(harmony_score(false));
    let (start, end) = bar();
    let out = copy_selection(&doc, 0, 0..1, start, end, &WriteOptions::default()).unwrap();
    assert_eq!(root_of(&out), "12");
}

#[test]
fn test_harmony_untouched_in_save_and_concert_pitch() {
    let doc = Document::new(harmony_score(false));
    let out = write_document(&doc, &WriteOptions::default()).unwrap();
    assert_eq!(root_of(&out), "14");

    let doc = Document::new(harmony_score(true));
    let (start, end) = bar();
    let out = copy_selection(&doc, 0, 0..1, start, end, &WriteOptions::default()).unwrap();
    assert_eq!(root_of(&out), "14");
}

#[test]
fn test_copy_drops_links() {
    let mut master = score(1, 1);
    let c = add_chord(&mut master, 0, Fraction::zero(), 60);
    let mut part = score(1, 1);
    let pc = add_chord(&mut part, 0, Fraction::zero(), 60);
    let mut doc = Document::new(master);
    let p = doc.add_part(part);
    doc.link(Lid(1), vec![ElementRef::new(0, c), ElementRef::new(p, pc)]);

    let saved = write_document(&doc, &WriteOptions::default()).unwrap();
    assert!(saved.contains("<linkedMain/>"));

    let (start, end) = bar();
    let copied = copy_selection(&doc, 0, 0..1, start, end, &WriteOptions::default()).unwrap();
    assert!(copied.contains("<Chord>"));
    assert!(!copied.contains("linkedMain"));
    assert!(!copied.contains("<linked>"));
}

#[test]
fn test_copy_renumbers_tracks_from_first_staff() {
    let mut score = score(2, 1);
    add_chord(&mut score, 4, Fraction::zero(), 60);
    let doc = Document::new(score);
    let options = WriteOptions { write_track: true, ..Default::default() };
    let (start, end) = bar();
    let out = copy_selection(&doc, 0, 1..2, start, end, &options).unwrap();
    let parsed = parse(&out);
    let chord = parsed.descendants().find(|n| n.has_tag_name("Chord")).unwrap();
    assert_eq!(child_text(chord, "track"), Some("0"));
    assert_eq!(parsed.root_element().attribute("staff"), Some("1"));
}

#[test]
fn test_copy_applies_selection_filter() {
    let mut score = score(1, 1);
    add_chord(&mut score, 0, Fraction::zero(), 60);
    add_chord(&mut score, 1, Fraction::zero(), 55);
    let breath = score.add(Element::new(ElementData::Breath).at(0, Fraction::new(1, 4)));
    place(&mut score, 0, Fraction::new(1, 4), breath);
    let doc = Document::new(score);

    let options = WriteOptions {
        filter: SelectionFilter { voices: vec![0], excluded_types: vec![ElementType::Breath] },
        ..Default::default()
    };
    let (start, end) = bar();
    let out = copy_selection(&doc, 0, 0..1, start, end, &options).unwrap();
    assert!(out.contains("<voice id=\"0\">"));
    assert!(!out.contains("<voice id=\"1\">"));
    assert!(!out.contains("<Breath>"));
}

#[test]
fn test_copied_spanner_carries_length() {
    let mut score = score(1, 1);
    let c = add_chord(&mut score, 0, Fraction::zero(), 60);
    score.add(
        Element::new(ElementData::Hairpin(HairpinData {
            hairpin_type: 0,
            line: SpannerData { ticks: Fraction::new(1, 2), end_element: Some(c), ..Default::default() },
        }))
        .at(0, Fraction::zero()),
    );
    let doc = Document::new(score);
    let (start, end) = bar();
    let out = copy_selection(&doc, 0, 0..1, start, end, &WriteOptions::default()).unwrap();
    assert!(out.contains("<ticks_f>1/2</ticks_f>"));

    let saved = write_document(&doc, &WriteOptions::default()).unwrap();
    assert!(!saved.contains("ticks_f"));
}
