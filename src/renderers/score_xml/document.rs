//! Document and clipboard entry points
//!
//! Both walk staves, then measures, then voices in order. The walk is what
//! keeps the tick cursor honest: an element whose tick is not where the
//! cursor stands is preceded by a `location` delta.

use crate::config::WriteOptions;
use crate::error::{WriteError, WriteResult};
use crate::models::{Document, Element, ElementData, ElementId, Fraction, DIVISION, VOICES};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::items::write_groups;
use super::lines::{write_spanner_end, write_spanner_start};
use super::location::Location;

pub const MSC_VERSION: &str = "4.00";

/// Tick window of one voice pass on one track
#[derive(Debug, Clone, Copy)]
struct VoiceRange {
    track: usize,
    from: Fraction,
    to: Fraction,
}

impl VoiceRange {
    fn contains(&self, tick: Fraction) -> bool {
        tick >= self.from && tick < self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SpannerEdge {
    Start,
    End,
}

/// Serialize every score of the document, master first
pub fn write_document(doc: &Document, options: &WriteOptions) -> WriteResult<String> {
    log::info!("writing document with {} score(s)", doc.scores.len());
    doc.check_ticks()?;

    let mut xml = XmlWriter::new();
    xml.header();
    xml.start_element_with("museScore", &[("version", MSC_VERSION.to_string())]);

    // one context for all scores, parts resolve their mains through it
    let mut ctx = WriteContext::new(options.clone());
    for idx in 0..doc.scores.len() {
        let s = ScoreRef::new(doc, idx).ok_or(WriteError::UnknownScore(idx))?;
        ctx.begin_score();
        write_score(&mut xml, &mut ctx, s);
    }
    if let Some(err) = ctx.take_overflow() {
        return Err(err.into());
    }

    xml.end_element();
    Ok(xml.finish())
}

fn write_score(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef) {
    xml.start_element("Score");
    xml.tag("Division", DIVISION);

    for e in s.elements(&s.score.system_elements) {
        write_element(xml, ctx, s, e);
    }

    for (staff_idx, staff) in s.score.staves.iter().enumerate() {
        xml.start_element_with("Staff", &[("id", (staff_idx + 1).to_string())]);
        if let Some(groups) = &staff.groups {
            write_groups(xml, groups);
        }
        for measure in &s.score.measures {
            xml.start_element("Measure");
            for voice in 0..VOICES {
                let track = staff_idx * VOICES + voice;
                let Some(ids) = measure.voices.get(&track) else {
                    continue;
                };
                let range = VoiceRange { track, from: measure.tick, to: measure.end_tick() };
                write_voice(xml, ctx, s, ids, range, None);
            }
            xml.end_element();
        }
        xml.end_element();
    }

    xml.end_element();
}

/// Copy a staff and tick range as a `StaffList`
///
/// Links are dropped, spanners carry their length, chord symbols are
/// transposed to written pitch and the selection filter applies.
pub fn copy_selection(
    doc: &Document,
    score: usize,
    staves: std::ops::Range<usize>,
    tick_start: Fraction,
    tick_end: Fraction,
    options: &WriteOptions,
) -> WriteResult<String> {
    let s = ScoreRef::new(doc, score).ok_or(WriteError::UnknownScore(score))?;
    if staves.is_empty() || staves.end > s.score.nstaves() {
        return Err(WriteError::InvalidSelection(format!(
            "staves {}..{} out of 0..{}",
            staves.start,
            staves.end,
            s.score.nstaves()
        )));
    }
    if tick_start >= tick_end {
        return Err(WriteError::InvalidSelection(format!("empty tick range {}..{}", tick_start, tick_end)));
    }
    s.score.check_ticks()?;
    let len = tick_end.checked_sub(tick_start)?;
    log::debug!("copy staves {:?} ticks {}..{}", staves, tick_start, tick_end);

    let mut ctx = WriteContext::clipboard(options.clone());
    ctx.begin_score();
    ctx.set_track_diff(-((staves.start * VOICES) as i32));

    let mut xml = XmlWriter::new();
    xml.start_element_with(
        "StaffList",
        &[
            ("version", MSC_VERSION.to_string()),
            ("tick", tick_start.to_string()),
            ("len", len.to_string()),
            ("staff", staves.start.to_string()),
            ("staves", staves.len().to_string()),
        ],
    );
    for (i, staff_idx) in staves.enumerate() {
        xml.start_element_with("Staff", &[("id", i.to_string())]);
        for voice in 0..VOICES {
            let track = staff_idx * VOICES + voice;
            if !ctx.can_write_voice(track) {
                continue;
            }
            let ids: Vec<ElementId> = s
                .score
                .measures
                .iter()
                .filter(|m| m.end_tick() > tick_start && m.tick < tick_end)
                .filter_map(|m| m.voices.get(&track))
                .flatten()
                .copied()
                .collect();
            let range = VoiceRange { track, from: tick_start, to: tick_end };
            write_voice(&mut xml, &mut ctx, s, &ids, range, Some(voice));
        }
        xml.end_element();
    }
    if let Some(err) = ctx.take_overflow() {
        return Err(err.into());
    }
    xml.end_element();
    Ok(xml.finish())
}

/// Non-slur spanners starting or ending on this track inside the range
fn spanner_edges<'a>(s: ScoreRef<'a>, range: VoiceRange) -> Vec<(Fraction, SpannerEdge, &'a Element)> {
    let mut edges = Vec::new();
    for sp in s.elements(&s.score.spanners) {
        if matches!(sp.data, ElementData::Slur(_)) {
            continue;
        }
        let Some(line) = sp.data.spanner() else {
            continue;
        };
        if sp.track == Some(range.track) && range.contains(sp.tick) {
            edges.push((sp.tick, SpannerEdge::Start, sp));
        }
        let end = sp.tick + line.ticks;
        // a zero-length spanner closes in the range it opens in
        let ends_here = if line.ticks.is_zero() {
            range.contains(end)
        } else {
            end > range.from && end <= range.to
        };
        if line.track2.or(sp.track) == Some(range.track) && ends_here {
            edges.push((end, SpannerEdge::End, sp));
        }
    }
    edges.sort_by_key(|(tick, edge, sp)| (*tick, *edge, sp.id));
    edges
}

/// Bring the cursor to `tick`, writing the delta when it moves
fn move_cursor(xml: &mut XmlWriter, ctx: &mut WriteContext, tick: Fraction) {
    if tick == ctx.cur_tick() {
        return;
    }
    match tick.checked_sub(ctx.cur_tick()) {
        Ok(frac) => Location { frac, rel: true, ..Location::default() }.write(xml),
        Err(err) => ctx.record_overflow(err),
    }
    ctx.set_cur_tick(tick);
}

fn write_spanner_edge(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, tick: Fraction, edge: SpannerEdge, sp: &Element) {
    match edge {
        SpannerEdge::Start => {
            if !ctx.can_write(sp) || !ctx.mark_spanner_written(s.idx, sp.id) {
                return;
            }
            move_cursor(xml, ctx, tick);
            write_spanner_start(xml, ctx, s, sp);
        }
        SpannerEdge::End => {
            if !ctx.can_close_spanner(s.idx, sp.id) {
                return;
            }
            move_cursor(xml, ctx, tick);
            write_spanner_end(xml, ctx, s, sp);
        }
    }
}

fn write_voice(
    xml: &mut XmlWriter,
    ctx: &mut WriteContext,
    s: ScoreRef,
    ids: &[ElementId],
    range: VoiceRange,
    voice_id: Option<usize>,
) {
    let elements: Vec<&Element> = s.elements(ids).filter(|e| range.contains(e.tick)).collect();
    let edges = spanner_edges(s, range);
    if elements.is_empty() && edges.is_empty() {
        return;
    }

    match voice_id {
        Some(id) => xml.start_element_with("voice", &[("id", id.to_string())]),
        None => xml.start_element("voice"),
    }
    ctx.set_cur_track(Some(range.track));
    ctx.set_cur_tick(range.from);

    let mut edges = edges.into_iter().peekable();
    for e in elements {
        while let Some((tick, edge, sp)) = edges.next_if(|(tick, _, _)| *tick <= e.tick) {
            write_spanner_edge(xml, ctx, s, tick, edge, sp);
        }
        move_cursor(xml, ctx, e.tick);
        write_element(xml, ctx, s, e);
    }
    for (tick, edge, sp) in edges {
        write_spanner_edge(xml, ctx, s, tick, edge, sp);
    }

    xml.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ChordData, ChordRestData, DurationType, HairpinData, Measure, Score, SpannerData,
    };

    fn rest(tick: Fraction) -> Element {
        Element::new(ElementData::Rest(ChordRestData::new(DurationType::Quarter, 0))).at(0, tick)
    }

    fn two_measures() -> Score {
        let mut score = Score::new(1);
        score.measures.push(Measure::new(Fraction::zero(), Fraction::one()));
        score.measures.push(Measure::new(Fraction::one(), Fraction::one()));
        score
    }

    #[test]
    fn test_document_frame() {
        let doc = Document::new(Score::new(1));
        let out = write_document(&doc, &WriteOptions::default()).unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains("<museScore version=\"4.00\">"));
        assert!(out.contains("<Division>480</Division>"));
        assert!(out.contains("<Staff id=\"1\">"));
    }

    #[test]
    fn test_gap_writes_location_delta() {
        let mut score = two_measures();
        let a = score.add(rest(Fraction::zero()));
        let b = score.add(rest(Fraction::new(3, 4)));
        score.place(0, 0, a);
        score.place(0, 0, b);
        let out = write_document(&Document::new(score), &WriteOptions::default()).unwrap();
        assert!(out.contains("<fractions>1/2</fractions>"));
    }

    #[test]
    fn test_hairpin_written_once_with_both_edges() {
        let mut score = two_measures();
        let a = score.add(rest(Fraction::zero()));
        let b = score.add(rest(Fraction::one()));
        score.place(0, 0, a);
        score.place(1, 0, b);
        score.add(
            Element::new(ElementData::Hairpin(HairpinData {
                hairpin_type: 0,
                line: SpannerData { ticks: Fraction::new(5, 4), end_element: Some(b), ..Default::default() },
            }))
            .at(0, Fraction::zero()),
        );
        let out = write_document(&Document::new(score), &WriteOptions::default()).unwrap();
        assert_eq!(out.matches("<Spanner type=\"Hairpin\">").count(), 2);
        assert_eq!(out.matches("<Hairpin>").count(), 1);
        assert!(out.contains("<next>"));
        assert!(out.contains("<prev>"));
    }

    #[test]
    fn test_overflowing_spanner_end_fails_the_save() {
        let mut score = two_measures();
        score.add(
            Element::new(ElementData::Hairpin(HairpinData {
                hairpin_type: 0,
                line: SpannerData { ticks: Fraction::new(1, i32::MAX), ..Default::default() },
            }))
            .at(0, Fraction::new(1, i32::MAX - 1)),
        );
        let doc = Document::new(score);
        assert!(matches!(write_document(&doc, &WriteOptions::default()), Err(WriteError::TickOverflow(_))));
        assert!(matches!(
            copy_selection(&doc, 0, 0..1, Fraction::zero(), Fraction::one(), &WriteOptions::default()),
            Err(WriteError::TickOverflow(_))
        ));
    }

    #[test]
    fn test_unrepresentable_cursor_fails_the_save() {
        let mut score = two_measures();
        let r = score.add(rest(Fraction::new(1, i32::MAX - 1)));
        score.place(0, 0, r);
        let err = write_document(&Document::new(score), &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, WriteError::TickOverflow(ref o) if o.op == '+'));
    }

    #[test]
    fn test_copy_selection_validates_range() {
        let doc = Document::new(two_measures());
        let options = WriteOptions::default();
        assert!(matches!(
            copy_selection(&doc, 0, 0..2, Fraction::zero(), Fraction::one(), &options),
            Err(WriteError::InvalidSelection(_))
        ));
        assert!(matches!(
            copy_selection(&doc, 0, 0..1, Fraction::one(), Fraction::one(), &options),
            Err(WriteError::InvalidSelection(_))
        ));
        assert!(matches!(
            copy_selection(&doc, 3, 0..1, Fraction::zero(), Fraction::one(), &options),
            Err(WriteError::UnknownScore(3))
        ));
    }

    #[test]
    fn test_copy_selection_staff_list() {
        let mut score = two_measures();
        let chord = ChordData::new(ChordRestData::new(DurationType::Quarter, 0));
        let c = score.add(Element::new(ElementData::Chord(chord)).at(0, Fraction::one()));
        score.place(1, 0, c);
        let doc = Document::new(score);
        let out = copy_selection(&doc, 0, 0..1, Fraction::one(), Fraction::new(2, 1), &WriteOptions::default()).unwrap();
        assert!(out.starts_with("<StaffList version=\"4.00\" tick=\"1/1\" len=\"1/1\" staff=\"0\" staves=\"1\">"));
        assert!(out.contains("<voice id=\"0\">"));
        assert!(out.contains("<Chord>"));
        assert!(!out.contains("<location>"));
    }
}
