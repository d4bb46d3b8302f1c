//! Type-specific element structure
//!
//! [`ElementData`] is the closed set of element kinds the write path knows.
//! Anything expressible as a property lives in the element's property map;
//! the structs here carry what is not (children, fragments, cached names).

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::element::{ElementId, ElementType};
use super::fraction::Fraction;
use super::fret::FretDiagram;
use super::value::{DirectionV, PointF};

/// Notated duration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    Measure,
    Long,
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    #[serde(rename = "16th")]
    D16th,
    #[serde(rename = "32nd")]
    D32nd,
    #[serde(rename = "64th")]
    D64th,
    #[serde(rename = "128th")]
    D128th,
    #[serde(rename = "256th")]
    D256th,
    #[serde(rename = "512th")]
    D512th,
    #[serde(rename = "1024th")]
    D1024th,
    Zero,
    Invalid,
}

impl DurationType {
    pub fn xml_name(self) -> &'static str {
        match self {
            DurationType::Measure => "measure",
            DurationType::Long => "long",
            DurationType::Breve => "breve",
            DurationType::Whole => "whole",
            DurationType::Half => "half",
            DurationType::Quarter => "quarter",
            DurationType::Eighth => "eighth",
            DurationType::D16th => "16th",
            DurationType::D32nd => "32nd",
            DurationType::D64th => "64th",
            DurationType::D128th => "128th",
            DurationType::D256th => "256th",
            DurationType::D512th => "512th",
            DurationType::D1024th => "1024th",
            DurationType::Zero => "zero",
            DurationType::Invalid => "",
        }
    }

    pub fn is_valid(self) -> bool {
        self != DurationType::Invalid
    }

    /// Nominal length including dots; `None` when the type has no fixed length
    pub fn fraction(self, dots: u8) -> Option<Fraction> {
        let base = match self {
            DurationType::Long => Fraction::new(4, 1),
            DurationType::Breve => Fraction::new(2, 1),
            DurationType::Whole => Fraction::new(1, 1),
            DurationType::Half => Fraction::new(1, 2),
            DurationType::Quarter => Fraction::new(1, 4),
            DurationType::Eighth => Fraction::new(1, 8),
            DurationType::D16th => Fraction::new(1, 16),
            DurationType::D32nd => Fraction::new(1, 32),
            DurationType::D64th => Fraction::new(1, 64),
            DurationType::D128th => Fraction::new(1, 128),
            DurationType::D256th => Fraction::new(1, 256),
            DurationType::D512th => Fraction::new(1, 512),
            DurationType::D1024th => Fraction::new(1, 1024),
            DurationType::Zero => Fraction::zero(),
            DurationType::Measure | DurationType::Invalid => return None,
        };
        let mut total = base;
        let mut part = base;
        for _ in 0..dots {
            part = part.checked_div(Fraction::new(2, 1)).ok()?;
            total = total.checked_add(part).ok()?;
        }
        Some(total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamMode {
    #[default]
    Auto,
    Begin,
    Mid,
    End,
    #[serde(rename = "no")]
    None,
    Begin32,
    Begin64,
}

impl BeamMode {
    pub fn xml_name(self) -> &'static str {
        match self {
            BeamMode::Auto => "auto",
            BeamMode::Begin => "begin",
            BeamMode::Mid => "mid",
            BeamMode::End => "end",
            BeamMode::None => "no",
            BeamMode::Begin32 => "begin32",
            BeamMode::Begin64 => "begin64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteType {
    #[default]
    Normal,
    Acciaccatura,
    Appoggiatura,
    Grace4,
    Grace16,
    Grace32,
    Grace8After,
    Grace16After,
    Grace32After,
}

impl NoteType {
    /// Presence-only marker tag; `None` for normal chords
    pub fn marker(self) -> Option<&'static str> {
        match self {
            NoteType::Normal => None,
            NoteType::Acciaccatura => Some("acciaccatura"),
            NoteType::Appoggiatura => Some("appoggiatura"),
            NoteType::Grace4 => Some("grace4"),
            NoteType::Grace16 => Some("grace16"),
            NoteType::Grace32 => Some("grace32"),
            NoteType::Grace8After => Some("grace8after"),
            NoteType::Grace16After => Some("grace16after"),
            NoteType::Grace32After => Some("grace32after"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TremoloChordType {
    #[default]
    TremoloSingle,
    TremoloFirstNote,
    TremoloSecondNote,
}

/// Shared state of chords and rests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordRestData {
    pub duration_type: DurationType,
    #[serde(default)]
    pub dots: u8,
    /// Actual length, tuplets included
    pub ticks: Fraction,
    #[serde(default)]
    pub beam_mode: BeamMode,
    #[serde(default)]
    pub beam: Option<ElementId>,
    #[serde(default)]
    pub lyrics: Vec<ElementId>,
}

impl ChordRestData {
    pub fn new(duration_type: DurationType, dots: u8) -> Self {
        Self {
            duration_type,
            dots,
            ticks: duration_type.fraction(dots).unwrap_or_default(),
            beam_mode: BeamMode::Auto,
            beam: None,
            lyrics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordData {
    pub cr: ChordRestData,
    #[serde(default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub grace_notes: Vec<ElementId>,
    #[serde(default)]
    pub articulations: Vec<ElementId>,
    #[serde(default)]
    pub no_stem: bool,
    #[serde(default)]
    pub stem: Option<ElementId>,
    #[serde(default)]
    pub hook: Option<ElementId>,
    #[serde(default)]
    pub stem_slash: Option<ElementId>,
    #[serde(default)]
    pub notes: Vec<ElementId>,
    #[serde(default)]
    pub arpeggio: Option<ElementId>,
    #[serde(default)]
    pub tremolo: Option<ElementId>,
    #[serde(default)]
    pub tremolo_chord_type: TremoloChordType,
}

impl ChordData {
    pub fn new(cr: ChordRestData) -> Self {
        Self {
            cr,
            note_type: NoteType::Normal,
            grace_notes: Vec::new(),
            articulations: Vec::new(),
            no_stem: false,
            stem: None,
            hook: None,
            stem_slash: None,
            notes: Vec::new(),
            arpeggio: None,
            tremolo: None,
            tremolo_chord_type: TremoloChordType::TremoloSingle,
        }
    }

    pub fn is_grace(&self) -> bool {
        self.note_type != NoteType::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoteData {
    #[serde(default)]
    pub accidental: Option<ElementId>,
}

/// Per-system beam fragment; index 0 holds the down/auto layout, 1 the up layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamFragment {
    pub py1: [f64; 2],
    pub py2: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamData {
    pub elements: Vec<ElementId>,
    #[serde(default)]
    pub direction: DirectionV,
    #[serde(default)]
    pub user_modified: bool,
    #[serde(default)]
    pub fragments: Vec<BeamFragment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChordLineData {
    /// Owning note, when attached to a note instead of the chord
    #[serde(default)]
    pub note: Option<ElementId>,
    #[serde(default)]
    pub length_x: f64,
    #[serde(default)]
    pub length_y: f64,
    #[serde(default)]
    pub modified: bool,
    #[serde(default)]
    pub path: Vec<PathElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionIconData {
    pub action_type: i32,
    #[serde(default)]
    pub action_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbitusData {
    #[serde(default)]
    pub head_group: i32,
    #[serde(default = "AmbitusData::default_head_type")]
    pub head_type: i32,
    #[serde(default)]
    pub direction: i32,
    #[serde(default = "default_true")]
    pub has_line: bool,
    #[serde(default = "AmbitusData::default_line_width")]
    pub line_width: f64,
    pub top_pitch: i32,
    pub top_tpc: i32,
    pub bottom_pitch: i32,
    pub bottom_tpc: i32,
    #[serde(default)]
    pub top_accidental: Option<ElementId>,
    #[serde(default)]
    pub bottom_accidental: Option<ElementId>,
}

impl AmbitusData {
    pub const NOTEHEADGROUP_DEFAULT: i32 = 0;
    pub const NOTEHEADTYPE_DEFAULT: i32 = -1;
    pub const DIR_DEFAULT: i32 = 0;
    pub const LINEWIDTH_DEFAULT: f64 = 0.12;

    fn default_head_type() -> i32 {
        Self::NOTEHEADTYPE_DEFAULT
    }

    fn default_line_width() -> f64 {
        Self::LINEWIDTH_DEFAULT
    }
}

fn default_true() -> bool {
    true
}

fn default_span() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArpeggioData {
    #[serde(default)]
    pub user_len1: f64,
    #[serde(default)]
    pub user_len2: f64,
    #[serde(default = "default_span")]
    pub span: i32,
}

impl Default for ArpeggioData {
    fn default() -> Self {
        Self { user_len1: 0.0, user_len2: 0.0, span: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticulationData {
    #[serde(default)]
    pub channel_name: String,
    /// Text articulations are persisted by text type instead of symbol
    #[serde(default)]
    pub text_type: Option<String>,
    #[serde(default)]
    pub sym_name: String,
}

impl ArticulationData {
    pub fn is_ornament(&self) -> bool {
        self.sym_name.starts_with("ornament")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchValue {
    pub time: i32,
    pub pitch: i32,
    #[serde(default)]
    pub vibrato: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BendData {
    pub points: Vec<PitchValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxKind {
    VBox,
    HBox,
    FBox,
    TBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxData {
    pub kind: BoxKind,
    /// Text frame content
    #[serde(default)]
    pub text: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketType {
    Normal,
    Brace,
    Square,
    Line,
    NoBracket,
}

impl BracketType {
    pub fn xml_name(self) -> &'static str {
        match self {
            BracketType::Normal => "Normal",
            BracketType::Brace => "Brace",
            BracketType::Square => "Square",
            BracketType::Line => "Line",
            BracketType::NoBracket => "NoBracket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketData {
    pub bracket_type: BracketType,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClefData {
    #[serde(default = "default_true")]
    pub show_courtesy: bool,
    #[serde(default)]
    pub for_instrument_change: bool,
}

impl Default for ClefData {
    fn default() -> Self {
        Self { show_courtesy: true, for_instrument_change: false }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicData {
    /// Rich text, already in markup form
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub velocity_change_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiguredBassData {
    #[serde(default = "default_true")]
    pub on_note: bool,
    #[serde(default)]
    pub ticks: Fraction,
    #[serde(default)]
    pub items: Vec<ElementId>,
    /// Raw text, used when the figures could not be parsed into items
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiguredBassItemData {
    #[serde(default)]
    pub parens: [i32; 5],
    #[serde(default)]
    pub prefix: i32,
    #[serde(default = "FiguredBassItemData::no_digit")]
    pub digit: i32,
    #[serde(default)]
    pub suffix: i32,
    #[serde(default)]
    pub cont_line: i32,
}

impl FiguredBassItemData {
    pub const MODIFIER_NONE: i32 = 0;
    pub const DIGIT_NONE: i32 = -1;
    pub const CONT_LINE_NONE: i32 = 0;

    fn no_digit() -> i32 {
        Self::DIGIT_NONE
    }
}

/// How a line spanner anchors its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpannerAnchor {
    #[default]
    Segment,
    Measure,
    Chord,
    Note,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpannerData {
    /// Length in time
    pub ticks: Fraction,
    #[serde(default)]
    pub track2: Option<usize>,
    #[serde(default)]
    pub start_element: Option<ElementId>,
    #[serde(default)]
    pub end_element: Option<ElementId>,
    #[serde(default)]
    pub segments: Vec<ElementId>,
    #[serde(default)]
    pub diagonal: bool,
    #[serde(default)]
    pub anchor: SpannerAnchor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlissandoData {
    #[serde(default)]
    pub show_text: bool,
    #[serde(default)]
    pub text: String,
    pub line: SpannerData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HairpinData {
    #[serde(default)]
    pub hairpin_type: i32,
    pub line: SpannerData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlurData {
    pub line: SpannerData,
    /// Split across a layout break and re-joined on load
    #[serde(default)]
    pub broken: bool,
}

/// One per-system fragment of a line spanner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentData {
    #[serde(default)]
    pub segment_type: i32,
    #[serde(default)]
    pub user_off2: PointF,
    #[serde(default)]
    pub pos2: PointF,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum NoteCaseType {
    Auto = -1,
    #[default]
    Capital = 0,
    Lower = 1,
    Upper = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HDegreeType {
    Undef,
    Add,
    Alter,
    Subtract,
}

impl HDegreeType {
    pub fn xml_name(self) -> Option<&'static str> {
        match self {
            HDegreeType::Add => Some("add"),
            HDegreeType::Alter => Some("alter"),
            HDegreeType::Subtract => Some("subtract"),
            HDegreeType::Undef => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HDegree {
    pub value: i32,
    pub alter: i32,
    pub kind: HDegreeType,
}

/// Chord symbol
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HarmonyData {
    #[serde(default)]
    pub root_tpc: Option<i32>,
    #[serde(default)]
    pub base_tpc: Option<i32>,
    #[serde(default)]
    pub root_case: NoteCaseType,
    #[serde(default)]
    pub base_case: NoteCaseType,
    /// Chord description id, 0 when unknown
    #[serde(default)]
    pub id: i32,
    /// Cached display name
    #[serde(default)]
    pub text_name: String,
    /// Name as the chord parser last produced it
    #[serde(default)]
    pub parsed_name: Option<String>,
    #[serde(default)]
    pub degrees: Vec<HDegree>,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub left_paren: bool,
    #[serde(default)]
    pub right_paren: bool,
    /// Tick of the owning segment; `None` when the parent is a fret diagram
    #[serde(default)]
    pub segment_tick: Option<Fraction>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HookData {
    pub sym_name: String,
    #[serde(default)]
    pub font: Option<String>,
}

/// One beaming rule: at position `pos` (in 32nds), apply `action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub pos: i32,
    pub action: i32,
}

/// Beam grouping of a time signature
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Groups {
    pub nodes: Vec<GroupNode>,
}

/// Type-specific element content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementData {
    Accidental,
    ActionIcon(ActionIconData),
    Ambitus(AmbitusData),
    Arpeggio(ArpeggioData),
    Articulation(ArticulationData),
    BagpipeEmbellishment { embel_type: String },
    BarLine,
    Beam(BeamData),
    Bend(BendData),
    Box(BoxData),
    Bracket(BracketData),
    Breath,
    Chord(ChordData),
    ChordLine(ChordLineData),
    Clef(ClefData),
    Dynamic(DynamicData),
    Fermata { sym_name: String },
    FiguredBass(FiguredBassData),
    FiguredBassItem(FiguredBassItemData),
    Fingering { text: String },
    FretDiagram(FretDiagram),
    Glissando(GlissandoData),
    GradualTempoChange(SpannerData),
    Hairpin(HairpinData),
    Harmony(HarmonyData),
    Hook(HookData),
    Lyrics { text: String },
    Note(NoteData),
    Rest(ChordRestData),
    Slur(SlurData),
    LineSegment(SegmentData),
    Stem,
    StemSlash,
    Text { text: String },
    Tremolo,
}

impl ElementData {
    pub fn ty(&self) -> ElementType {
        match self {
            ElementData::Accidental => ElementType::Accidental,
            ElementData::ActionIcon(_) => ElementType::ActionIcon,
            ElementData::Ambitus(_) => ElementType::Ambitus,
            ElementData::Arpeggio(_) => ElementType::Arpeggio,
            ElementData::Articulation(_) => ElementType::Articulation,
            ElementData::BagpipeEmbellishment { .. } => ElementType::BagpipeEmbellishment,
            ElementData::BarLine => ElementType::BarLine,
            ElementData::Beam(_) => ElementType::Beam,
            ElementData::Bend(_) => ElementType::Bend,
            ElementData::Box(b) => match b.kind {
                BoxKind::VBox => ElementType::VBox,
                BoxKind::HBox => ElementType::HBox,
                BoxKind::FBox => ElementType::FBox,
                BoxKind::TBox => ElementType::TBox,
            },
            ElementData::Bracket(_) => ElementType::Bracket,
            ElementData::Breath => ElementType::Breath,
            ElementData::Chord(_) => ElementType::Chord,
            ElementData::ChordLine(_) => ElementType::ChordLine,
            ElementData::Clef(_) => ElementType::Clef,
            ElementData::Dynamic(_) => ElementType::Dynamic,
            ElementData::Fermata { .. } => ElementType::Fermata,
            ElementData::FiguredBass(_) => ElementType::FiguredBass,
            ElementData::FiguredBassItem(_) => ElementType::FiguredBassItem,
            ElementData::Fingering { .. } => ElementType::Fingering,
            ElementData::FretDiagram(_) => ElementType::FretDiagram,
            ElementData::Glissando(_) => ElementType::Glissando,
            ElementData::GradualTempoChange(_) => ElementType::GradualTempoChange,
            ElementData::Hairpin(_) => ElementType::Hairpin,
            ElementData::Harmony(_) => ElementType::Harmony,
            ElementData::Hook(_) => ElementType::Hook,
            ElementData::Lyrics { .. } => ElementType::Lyrics,
            ElementData::Note(_) => ElementType::Note,
            ElementData::Rest(_) => ElementType::Rest,
            ElementData::Slur(_) => ElementType::Slur,
            ElementData::LineSegment(_) => ElementType::LineSegment,
            ElementData::Stem => ElementType::Stem,
            ElementData::StemSlash => ElementType::StemSlash,
            ElementData::Text { .. } => ElementType::Text,
            ElementData::Tremolo => ElementType::Tremolo,
        }
    }

    pub fn chord_rest(&self) -> Option<&ChordRestData> {
        match self {
            ElementData::Chord(c) => Some(&c.cr),
            ElementData::Rest(r) => Some(r),
            _ => None,
        }
    }

    pub fn chord(&self) -> Option<&ChordData> {
        match self {
            ElementData::Chord(c) => Some(c),
            _ => None,
        }
    }

    /// Line data of spanner kinds
    pub fn spanner(&self) -> Option<&SpannerData> {
        match self {
            ElementData::Glissando(g) => Some(&g.line),
            ElementData::GradualTempoChange(l) => Some(l),
            ElementData::Hairpin(h) => Some(&h.line),
            ElementData::Slur(s) => Some(&s.line),
            _ => None,
        }
    }
}
