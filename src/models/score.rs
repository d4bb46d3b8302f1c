//! Document, scores, staves and measures
//!
//! A [`Document`] owns one master score plus any number of linked part
//! scores. Elements live in a per-score arena and are addressed by
//! [`ElementId`]; cross-score references use [`ElementRef`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::element::{Element, ElementId, ElementRef, Lid, MAX_TAGS, VOICES};
use super::fraction::{Fraction, FractionOverflow};
use super::interval::Interval;
use super::items::{ElementData, Groups, SpannerAnchor};
use super::style::Style;

/// Raster resolution the geometry is stored in
pub const DPI: f64 = 360.0;
/// Dots per millimetre
pub const DPMM: f64 = DPI / 25.4;
/// Spatium of a standard 20pt staff, in raster units
pub const SPATIUM20: f64 = 24.8;

/// Staff address across scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffRef {
    pub score: usize,
    pub staff: usize,
}

/// Members that represent the same object in linked scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGroup<T> {
    pub members: Vec<T>,
    /// Index into `members` of the main element
    #[serde(default)]
    pub main: usize,
}

impl<T: Copy + PartialEq> LinkGroup<T> {
    pub fn new(members: Vec<T>) -> Self {
        Self { members, main: 0 }
    }

    pub fn main_element(&self) -> Option<T> {
        self.members.get(self.main).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// An instrument change on a staff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentChange {
    pub tick: Fraction,
    pub transpose: Interval,
}

fn one() -> Fraction {
    Fraction::one()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub links: Option<Lid>,
    /// Local time stretch (e.g. from a local time signature)
    #[serde(default = "one")]
    pub time_stretch: Fraction,
    /// Transposition of the instrument at the start of the score
    #[serde(default)]
    pub transpose: Interval,
    #[serde(default)]
    pub instrument_changes: Vec<InstrumentChange>,
    /// Beam groups of the staff's time signature
    #[serde(default)]
    pub groups: Option<Groups>,
}

impl Default for Staff {
    fn default() -> Self {
        Self {
            links: None,
            time_stretch: Fraction::one(),
            transpose: Interval::default(),
            instrument_changes: Vec::new(),
            groups: None,
        }
    }
}

impl Staff {
    /// Time stretch applied to durations on this staff
    pub fn stretch(&self) -> Fraction {
        if self.time_stretch.is_zero() {
            Fraction::one()
        } else {
            self.time_stretch
        }
    }

    /// Instrument transposition in effect at `tick`; `None` uses the initial instrument
    pub fn transpose_at(&self, tick: Option<Fraction>) -> Interval {
        let Some(tick) = tick else {
            return self.transpose;
        };
        self.instrument_changes
            .iter()
            .filter(|c| c.tick <= tick)
            .max_by_key(|c| c.tick)
            .map(|c| c.transpose)
            .unwrap_or(self.transpose)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub tick: Fraction,
    pub len: Fraction,
    /// Ordered content per track
    #[serde(default)]
    pub voices: BTreeMap<usize, Vec<ElementId>>,
}

impl Measure {
    pub fn new(tick: Fraction, len: Fraction) -> Self {
        Self { tick, len, voices: BTreeMap::new() }
    }

    pub fn end_tick(&self) -> Fraction {
        self.tick + self.len
    }
}

fn default_spatium() -> f64 {
    SPATIUM20
}

fn default_layer_tags() -> Vec<String> {
    let mut tags = vec![String::new(); MAX_TAGS];
    tags[0] = "default".to_string();
    tags
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_master: bool,
    /// Palette cells are tiny scores holding one item each
    #[serde(default)]
    pub is_palette: bool,
    #[serde(default = "default_spatium")]
    pub spatium: f64,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_layer_tags")]
    pub layer_tags: Vec<String>,
    #[serde(default)]
    pub staves: Vec<Staff>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Spanner index
    #[serde(default)]
    pub spanners: Vec<ElementId>,
    /// Frames and system brackets, written ahead of the staves
    #[serde(default)]
    pub system_elements: Vec<ElementId>,
}

impl Score {
    pub fn new(staves: usize) -> Self {
        Self {
            name: String::new(),
            is_master: false,
            is_palette: false,
            spatium: SPATIUM20,
            style: Style::default(),
            layer_tags: default_layer_tags(),
            staves: (0..staves).map(|_| Staff::default()).collect(),
            measures: Vec::new(),
            elements: Vec::new(),
            spanners: Vec::new(),
            system_elements: Vec::new(),
        }
    }

    /// Add an element to the arena and return its id
    pub fn add(&mut self, mut element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        element.id = id;
        if element.data.spanner().is_some() {
            self.spanners.push(id);
        }
        self.elements.push(element);
        id
    }

    /// Append an element id to a measure's voice list
    pub fn place(&mut self, measure: usize, track: usize, id: ElementId) {
        if let Some(m) = self.measures.get_mut(measure) {
            m.voices.entry(track).or_default().push(id);
        }
    }

    /// Restore arena ids after deserialization
    pub fn reindex(&mut self) {
        for (i, e) in self.elements.iter_mut().enumerate() {
            e.id = ElementId(i);
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn staff(&self, idx: usize) -> Option<&Staff> {
        self.staves.get(idx)
    }

    pub fn nstaves(&self) -> usize {
        self.staves.len()
    }

    /// Index of the measure containing `tick`
    pub fn tick2measure(&self, tick: Fraction) -> Option<usize> {
        self.measures
            .iter()
            .position(|m| tick >= m.tick && tick < m.end_tick())
            .or_else(|| {
                // the end of the last measure still belongs to it
                let last = self.measures.len().checked_sub(1)?;
                (tick == self.measures[last].end_tick()).then_some(last)
            })
    }

    /// Spanners whose [start, end] tick range intersects [start, end]
    pub fn find_overlapping(&self, start: i32, end: i32) -> Vec<ElementId> {
        let mut found: Vec<&Element> = self
            .spanners
            .iter()
            .filter_map(|id| self.element(*id))
            .filter(|e| {
                let Some(line) = e.data.spanner() else {
                    return false;
                };
                let s = e.tick.ticks();
                let t = (e.tick + line.ticks).ticks();
                s <= end && t >= start
            })
            .collect();
        found.sort_by_key(|e| (e.tick, e.id));
        found.into_iter().map(|e| e.id).collect()
    }

    /// Chord or rest at `tick` on `track`
    pub fn chord_rest_at(&self, track: usize, tick: Fraction) -> Option<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.track == Some(track) && e.tick == tick)
            .find(|e| e.data.chord_rest().is_some() && !is_grace(e))
            .map(|e| e.id)
    }

    /// Resolve the end anchor of a spanner from its end tick
    ///
    /// Segment-anchored lines end on the last chord/rest before their end
    /// tick; chord-anchored spanners end on the chord/rest at the end tick.
    pub fn compute_end_element(&self, spanner: &Element) -> Option<ElementId> {
        let line = spanner.data.spanner()?;
        let track = line.track2.or(spanner.track)?;
        let end = spanner.tick + line.ticks;
        match line.anchor {
            SpannerAnchor::Chord | SpannerAnchor::Note => self.chord_rest_at(track, end),
            SpannerAnchor::Segment | SpannerAnchor::Measure => self
                .elements
                .iter()
                .filter(|e| e.track == Some(track) && e.tick < end && e.tick >= spanner.tick)
                .filter(|e| e.data.chord_rest().is_some() && !is_grace(e))
                .max_by_key(|e| e.tick)
                .map(|e| e.id),
        }
    }

    /// Staff that hosts `track`, if any
    pub fn staff_for_track(&self, track: usize) -> Option<&Staff> {
        self.staff(track / VOICES)
    }

    /// Evaluate, with overflow checks, the tick sums a write pass derives
    /// from the score: measure ends, spanner ends, measure-relative ticks
    /// and stretched chord-rest lengths
    pub fn check_ticks(&self) -> Result<(), FractionOverflow> {
        for m in &self.measures {
            m.tick.checked_add(m.len)?;
        }
        let relative = |tick: Fraction| -> Result<(), FractionOverflow> {
            if let Some(m) = self.tick2measure(tick) {
                tick.checked_sub(self.measures[m].tick)?;
            }
            Ok(())
        };
        for e in &self.elements {
            relative(e.tick)?;
            if let Some(line) = e.data.spanner() {
                relative(e.tick.checked_add(line.ticks)?)?;
            }
            if let Some(cr) = e.data.chord_rest() {
                let stretch = e.staff_idx().and_then(|idx| self.staff(idx)).map(|st| st.stretch());
                cr.ticks.checked_div(stretch.unwrap_or_else(Fraction::one))?;
            }
        }
        Ok(())
    }
}

fn is_grace(e: &Element) -> bool {
    matches!(&e.data, ElementData::Chord(c) if c.is_grace())
}

/// The whole persisted document: master score, linked parts and link tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Index 0 is the master score
    pub scores: Vec<Score>,
    #[serde(default)]
    pub links: BTreeMap<Lid, LinkGroup<ElementRef>>,
    #[serde(default)]
    pub staff_links: BTreeMap<Lid, LinkGroup<StaffRef>>,
}

impl Document {
    pub fn new(master: Score) -> Self {
        let mut master = master;
        master.is_master = true;
        Self {
            scores: vec![master],
            links: BTreeMap::new(),
            staff_links: BTreeMap::new(),
        }
    }

    /// Add a linked part score and return its index
    pub fn add_part(&mut self, part: Score) -> usize {
        self.scores.push(part);
        self.scores.len() - 1
    }

    pub fn score(&self, idx: usize) -> Option<&Score> {
        self.scores.get(idx)
    }

    pub fn score_mut(&mut self, idx: usize) -> Option<&mut Score> {
        self.scores.get_mut(idx)
    }

    pub fn element(&self, r: ElementRef) -> Option<&Element> {
        self.score(r.score)?.element(r.element)
    }

    pub fn check_ticks(&self) -> Result<(), FractionOverflow> {
        self.scores.iter().try_for_each(Score::check_ticks)
    }

    /// Link elements; the first member becomes the main element
    pub fn link(&mut self, lid: Lid, members: Vec<ElementRef>) {
        for m in &members {
            if let Some(e) = self.score_mut(m.score).and_then(|s| s.element_mut(m.element)) {
                e.links = Some(lid);
            }
        }
        self.links.insert(lid, LinkGroup::new(members));
    }

    /// Link staves; the first member becomes the main staff
    pub fn link_staves(&mut self, lid: Lid, members: Vec<StaffRef>) {
        for m in &members {
            if let Some(s) = self.score_mut(m.score).and_then(|s| s.staves.get_mut(m.staff)) {
                s.links = Some(lid);
            }
        }
        self.staff_links.insert(lid, LinkGroup::new(members));
    }

    pub fn link_group(&self, lid: Lid) -> Option<&LinkGroup<ElementRef>> {
        self.links.get(&lid)
    }

    pub fn staff_link_group(&self, lid: Lid) -> Option<&LinkGroup<StaffRef>> {
        self.staff_links.get(&lid)
    }

    /// Parse a JSON document and restore element ids
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Document = serde_json::from_str(json)?;
        for score in &mut doc.scores {
            score.reindex();
        }
        if let Some(master) = doc.scores.first_mut() {
            master.is_master = true;
        }
        Ok(doc)
    }
}
