//! Per-pass write state
//!
//! One [`WriteContext`] lives for exactly one serialization pass and is
//! threaded through every writer by `&mut`. Its fields are the only channel
//! writers use to talk to each other: the tick cursor, the current track,
//! the clipboard switch and the link index table.

use std::collections::{HashMap, HashSet};

use crate::config::WriteOptions;
use crate::models::{Document, Element, ElementId, Fraction, FractionOverflow, Lid, Score, Style};

use super::location::Location;

/// Read-only view of one score inside its document
#[derive(Clone, Copy)]
pub struct ScoreRef<'a> {
    pub doc: &'a Document,
    pub idx: usize,
    pub score: &'a Score,
}

impl<'a> ScoreRef<'a> {
    pub fn new(doc: &'a Document, idx: usize) -> Option<Self> {
        doc.score(idx).map(|score| Self { doc, idx, score })
    }

    pub fn element(&self, id: ElementId) -> Option<&'a Element> {
        self.score.element(id)
    }

    pub fn style(&self) -> &'a Style {
        &self.score.style
    }

    pub fn spatium(&self) -> f64 {
        self.score.spatium
    }

    /// Elements for a list of ids, skipping dangling ones
    pub fn elements<'b>(&self, ids: &'b [ElementId]) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        let score = self.score;
        ids.iter().filter_map(move |id| score.element(*id))
    }
}

/// Assigns local indices to link mains that share a location
///
/// Consecutive mains at the same location get 0, 1, 2 ...; a new location
/// resets the count. The reader replays the same sequence.
#[derive(Debug, Default)]
pub struct LinksIndexer {
    last_location: Option<Location>,
    last_index: i32,
}

impl LinksIndexer {
    pub fn assign_local_index(&mut self, location: &Location) -> i32 {
        if self.last_location.as_ref() == Some(location) {
            self.last_index += 1;
            return self.last_index;
        }
        self.last_index = 0;
        self.last_location = Some(*location);
        0
    }
}

#[derive(Debug)]
pub struct WriteContext {
    options: WriteOptions,
    clipboard_mode: bool,
    cur_tick: Fraction,
    cur_track: Option<usize>,
    track_diff: i32,
    links_indexer: LinksIndexer,
    lid_local_index: HashMap<Lid, i32>,
    written_spanners: HashSet<(usize, ElementId)>,
    overflow: Option<FractionOverflow>,
}

impl WriteContext {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            options,
            clipboard_mode: false,
            cur_tick: Fraction::zero(),
            cur_track: None,
            track_diff: 0,
            links_indexer: LinksIndexer::default(),
            lid_local_index: HashMap::new(),
            written_spanners: HashSet::new(),
            overflow: None,
        }
    }

    /// Context for a copy to the clipboard: links dropped, selection filter active
    pub fn clipboard(options: WriteOptions) -> Self {
        let mut ctx = Self::new(options);
        ctx.clipboard_mode = true;
        ctx
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    pub fn clipboard_mode(&self) -> bool {
        self.clipboard_mode
    }

    pub fn test_mode(&self) -> bool {
        self.options.test_mode
    }

    pub fn write_track(&self) -> bool {
        self.options.write_track
    }

    pub fn write_position(&self) -> bool {
        self.options.write_position
    }

    pub fn cur_tick(&self) -> Fraction {
        self.cur_tick
    }

    pub fn set_cur_tick(&mut self, tick: Fraction) {
        self.cur_tick = tick;
    }

    pub fn inc_cur_tick(&mut self, ticks: Fraction) {
        match self.cur_tick.checked_add(ticks) {
            Ok(tick) => self.cur_tick = tick,
            Err(err) => self.record_overflow(err),
        }
    }

    /// Keep the first tick overflow of the pass; the entry point fails with it
    pub fn record_overflow(&mut self, err: FractionOverflow) {
        log::warn!("tick overflow while writing: {}", err);
        self.overflow.get_or_insert(err);
    }

    pub fn take_overflow(&mut self) -> Option<FractionOverflow> {
        self.overflow.take()
    }

    pub fn cur_track(&self) -> Option<usize> {
        self.cur_track
    }

    pub fn set_cur_track(&mut self, track: Option<usize>) {
        self.cur_track = track;
    }

    pub fn track_diff(&self) -> i32 {
        self.track_diff
    }

    /// Offset added to written tracks, e.g. when a copy starts on a lower staff
    pub fn set_track_diff(&mut self, diff: i32) {
        self.track_diff = diff;
    }

    /// Start a new score: link indices restart, registered mains are kept
    pub fn begin_score(&mut self) {
        self.links_indexer = LinksIndexer::default();
        self.cur_tick = Fraction::zero();
        self.cur_track = None;
    }

    pub fn assign_local_index(&mut self, location: &Location) -> i32 {
        self.links_indexer.assign_local_index(location)
    }

    pub fn set_lid_local_index(&mut self, lid: Lid, index: i32) {
        self.lid_local_index.insert(lid, index);
    }

    pub fn lid_local_index(&self, lid: Lid) -> i32 {
        self.lid_local_index.get(&lid).copied().unwrap_or(0)
    }

    /// Whether an element passes the selection filter of this pass
    pub fn can_write(&self, element: &Element) -> bool {
        !self.clipboard_mode || self.options.filter.can_select(element)
    }

    pub fn can_write_voice(&self, track: usize) -> bool {
        !self.clipboard_mode || self.options.filter.can_select_voice(track % crate::models::VOICES)
    }

    /// Record a spanner as written; false if it already was
    pub fn mark_spanner_written(&mut self, score: usize, id: ElementId) -> bool {
        self.written_spanners.insert((score, id))
    }

    pub fn spanner_written(&self, score: usize, id: ElementId) -> bool {
        self.written_spanners.contains(&(score, id))
    }

    /// Whether an end marker may be written for this spanner
    ///
    /// A copy can cut a spanner's start away; its end is then dropped too.
    /// A full save writes every start somewhere in the pass.
    pub fn can_close_spanner(&self, score: usize, id: ElementId) -> bool {
        !self.clipboard_mode || self.spanner_written(score, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionFilter;
    use crate::models::{ElementData, ElementType};

    fn loc(frac: Fraction) -> Location {
        Location { frac, ..Location::default() }
    }

    #[test]
    fn test_indexer_counts_repeated_locations() {
        let mut indexer = LinksIndexer::default();
        let a = loc(Fraction::zero());
        let b = loc(Fraction::new(1, 4));
        assert_eq!(indexer.assign_local_index(&a), 0);
        assert_eq!(indexer.assign_local_index(&a), 1);
        assert_eq!(indexer.assign_local_index(&b), 0);
        assert_eq!(indexer.assign_local_index(&a), 0);
    }

    #[test]
    fn test_filter_only_applies_to_clipboard() {
        let options = WriteOptions {
            filter: SelectionFilter { voices: vec![], excluded_types: vec![ElementType::Breath] },
            ..Default::default()
        };
        let breath = Element::new(ElementData::Breath);
        assert!(WriteContext::new(options.clone()).can_write(&breath));
        assert!(!WriteContext::clipboard(options).can_write(&breath));
    }

    #[test]
    fn test_cursor_overflow_is_kept_until_taken() {
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_tick(Fraction::new(1, i32::MAX));
        ctx.inc_cur_tick(Fraction::new(1, i32::MAX - 1));
        assert_eq!(ctx.cur_tick(), Fraction::new(1, i32::MAX));
        assert!(ctx.take_overflow().is_some());
        assert!(ctx.take_overflow().is_none());
    }

    #[test]
    fn test_unregistered_lid_reads_zero() {
        let mut ctx = WriteContext::new(WriteOptions::default());
        assert_eq!(ctx.lid_local_index(Lid(7)), 0);
        ctx.set_lid_local_index(Lid(7), 3);
        assert_eq!(ctx.lid_local_index(Lid(7)), 3);
    }
}
