//! Elements of the document graph and their property model
//!
//! An [`Element`] is one node of a score: a type tag (carried by its
//! [`ElementData`] variant), a position (track and tick), a set of property
//! entries and an optional link group membership.
//!
//! # Property resolution
//!
//! ```text
//! get_property(pid)       entry value -> default
//! property_default(pid)   styled table (style sheet) -> per-element default -> intrinsic default
//! property_flags(pid)     explicit entry flags -> Styled if pid is in the styled table -> NoStyle
//! ```
//!
//! A property with neither a value nor a default is invalid; the write path
//! logs and skips it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fraction::Fraction;
use super::items::ElementData;
use super::pid::{Pid, PropertyFlags, Sid};
use super::style::Style;
use super::value::{Color, DirectionV, PlacementV, PointF, PropertyValue};

/// Voices per staff
pub const VOICES: usize = 4;

/// Number of layer tags an element can carry
pub const MAX_TAGS: usize = 32;

/// Index of an element inside its score's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

/// Document-wide address of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef {
    pub score: usize,
    pub element: ElementId,
}

impl ElementRef {
    pub fn new(score: usize, element: ElementId) -> Self {
        Self { score, element }
    }
}

/// Link group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lid(pub i32);

/// Element type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Accidental,
    ActionIcon,
    Ambitus,
    Arpeggio,
    Articulation,
    BagpipeEmbellishment,
    BarLine,
    Beam,
    Bend,
    HBox,
    VBox,
    FBox,
    TBox,
    Bracket,
    Breath,
    Chord,
    ChordLine,
    Clef,
    Dynamic,
    Fermata,
    FiguredBass,
    FiguredBassItem,
    Fingering,
    FretDiagram,
    Glissando,
    GradualTempoChange,
    Hairpin,
    Harmony,
    Hook,
    Lyrics,
    Note,
    Rest,
    Slur,
    LineSegment,
    Stem,
    StemSlash,
    Text,
    Tremolo,
}

impl ElementType {
    /// Element tag name in the persisted format
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Accidental => "Accidental",
            ElementType::ActionIcon => "ActionIcon",
            ElementType::Ambitus => "Ambitus",
            ElementType::Arpeggio => "Arpeggio",
            ElementType::Articulation => "Articulation",
            ElementType::BagpipeEmbellishment => "BagpipeEmbellishment",
            ElementType::BarLine => "BarLine",
            ElementType::Beam => "Beam",
            ElementType::Bend => "Bend",
            ElementType::HBox => "HBox",
            ElementType::VBox => "VBox",
            ElementType::FBox => "FBox",
            ElementType::TBox => "TBox",
            ElementType::Bracket => "Bracket",
            ElementType::Breath => "Breath",
            ElementType::Chord => "Chord",
            ElementType::ChordLine => "ChordLine",
            ElementType::Clef => "Clef",
            ElementType::Dynamic => "Dynamic",
            ElementType::Fermata => "Fermata",
            ElementType::FiguredBass => "FiguredBass",
            ElementType::FiguredBassItem => "FiguredBassItem",
            ElementType::Fingering => "Fingering",
            ElementType::FretDiagram => "FretDiagram",
            ElementType::Glissando => "Glissando",
            ElementType::GradualTempoChange => "GradualTempoChange",
            ElementType::Hairpin => "Hairpin",
            ElementType::Harmony => "Harmony",
            ElementType::Hook => "Hook",
            ElementType::Lyrics => "Lyrics",
            ElementType::Note => "Note",
            ElementType::Rest => "Rest",
            ElementType::Slur => "Slur",
            ElementType::LineSegment => "LineSegment",
            ElementType::Stem => "Stem",
            ElementType::StemSlash => "StemSlash",
            ElementType::Text => "Text",
            ElementType::Tremolo => "Tremolo",
        }
    }

    /// Default stacking order
    pub fn default_z(self) -> i32 {
        (self as i32 + 1) * 100
    }

    fn default_text_style(self) -> &'static str {
        match self {
            ElementType::Dynamic => "dynamics",
            ElementType::Fingering => "fingering",
            ElementType::Harmony => "harmony",
            ElementType::Lyrics => "lyrics_odd",
            ElementType::FiguredBass => "figured_bass",
            ElementType::TBox => "frame",
            _ => "default",
        }
    }

    fn default_placement(self) -> PlacementV {
        match self {
            ElementType::Harmony
            | ElementType::FretDiagram
            | ElementType::Fermata
            | ElementType::Breath
            | ElementType::GradualTempoChange
            | ElementType::Fingering => PlacementV::Above,
            _ => PlacementV::Below,
        }
    }
}

/// Stored value and style state of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub value: PropertyValue,
    /// `None` derives the state from the element's styled table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<PropertyFlags>,
}

/// Property whose default is taken from the style sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledProperty {
    pub pid: Pid,
    pub sid: Sid,
}

fn default_tag() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Arena index, restored by `Score::reindex` after loading
    #[serde(default)]
    pub id: ElementId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,

    /// `None` for elements outside any staff (frames, system brackets)
    #[serde(default)]
    pub track: Option<usize>,

    /// Absolute tick
    #[serde(default)]
    pub tick: Fraction,

    #[serde(default)]
    pub properties: BTreeMap<Pid, PropertyEntry>,

    #[serde(default)]
    pub styled: Vec<StyledProperty>,

    /// Element-specific defaults that differ from the intrinsic ones
    #[serde(default)]
    pub defaults: BTreeMap<Pid, PropertyValue>,

    /// Layer bitmask; bit 0 is the default layer
    #[serde(default = "default_tag")]
    pub tag: u32,

    #[serde(default)]
    pub links: Option<Lid>,

    /// Created by layout rather than by the user
    #[serde(default)]
    pub generated: bool,

    #[serde(default = "default_true")]
    pub offset_spatium_dependent: bool,

    #[serde(default)]
    pub children: Vec<ElementId>,

    pub data: ElementData,
}

impl Element {
    pub fn new(data: ElementData) -> Self {
        Self {
            id: ElementId::default(),
            parent: None,
            track: None,
            tick: Fraction::zero(),
            properties: BTreeMap::new(),
            styled: Vec::new(),
            defaults: BTreeMap::new(),
            tag: 1,
            links: None,
            generated: false,
            offset_spatium_dependent: true,
            children: Vec::new(),
            data,
        }
    }

    /// Place the element on a track at an absolute tick
    pub fn at(mut self, track: usize, tick: Fraction) -> Self {
        self.track = Some(track);
        self.tick = tick;
        self
    }

    /// Set a value, leaving its style state derived
    pub fn with(mut self, pid: Pid, value: PropertyValue) -> Self {
        self.properties.insert(pid, PropertyEntry { value, flags: None });
        self
    }

    /// Set a value with an explicit style state
    pub fn with_flags(mut self, pid: Pid, value: PropertyValue, flags: PropertyFlags) -> Self {
        self.properties.insert(pid, PropertyEntry { value, flags: Some(flags) });
        self
    }

    /// Back a property by a style sheet entry
    pub fn styled(mut self, pid: Pid, sid: Sid) -> Self {
        self.styled.push(StyledProperty { pid, sid });
        self
    }

    pub fn with_default(mut self, pid: Pid, value: PropertyValue) -> Self {
        self.defaults.insert(pid, value);
        self
    }

    pub fn linked(mut self, lid: Lid) -> Self {
        self.links = Some(lid);
        self
    }

    pub fn ty(&self) -> ElementType {
        self.data.ty()
    }

    pub fn type_name(&self) -> &'static str {
        self.ty().name()
    }

    pub fn is_beam(&self) -> bool {
        self.ty() == ElementType::Beam
    }

    pub fn staff_idx(&self) -> Option<usize> {
        self.track.map(|t| t / VOICES)
    }

    pub fn voice(&self) -> usize {
        self.track.map(|t| t % VOICES).unwrap_or(0)
    }

    fn styled_sid(&self, pid: Pid) -> Option<Sid> {
        self.styled.iter().find(|s| s.pid == pid).map(|s| s.sid)
    }

    pub fn property_flags(&self, pid: Pid) -> PropertyFlags {
        if let Some(flags) = self.properties.get(&pid).and_then(|e| e.flags) {
            return flags;
        }
        if self.styled_sid(pid).is_some() {
            PropertyFlags::Styled
        } else {
            PropertyFlags::NoStyle
        }
    }

    pub fn is_styled(&self, pid: Pid) -> bool {
        self.property_flags(pid) == PropertyFlags::Styled
    }

    /// Current value of a property. `None` means the property is invalid
    /// for this element.
    ///
    /// Autoplace reads as disabled whenever the global style disables it.
    pub fn get_property(&self, style: &Style, pid: Pid) -> Option<PropertyValue> {
        if pid == Pid::Autoplace {
            let own = self
                .properties
                .get(&pid)
                .map(|e| e.value.to_bool())
                .unwrap_or(true);
            return Some(PropertyValue::Bool(style.autoplace_enabled() && own));
        }
        match self.properties.get(&pid) {
            Some(entry) => Some(entry.value.clone()),
            None => self.property_default(style, pid),
        }
    }

    pub fn property_default(&self, style: &Style, pid: Pid) -> Option<PropertyValue> {
        if let Some(sid) = self.styled_sid(pid) {
            if let Some(v) = style.value(sid) {
                return Some(v.clone());
            }
        }
        if let Some(v) = self.defaults.get(&pid) {
            return Some(v.clone());
        }
        intrinsic_default(self.ty(), pid)
    }

    /// Whether any styled or common layout property deviates from its default
    pub fn is_user_modified(&self, style: &Style) -> bool {
        let styled = self.styled.iter().map(|s| s.pid);
        let common = [Pid::Visible, Pid::Offset, Pid::Color, Pid::Z, Pid::Autoplace];
        styled
            .chain(common)
            .any(|pid| self.get_property(style, pid) != self.property_default(style, pid))
    }

    pub fn offset(&self, style: &Style) -> PointF {
        self.get_property(style, Pid::Offset)
            .map(|v| v.to_point())
            .unwrap_or_default()
    }

    pub fn visible(&self, style: &Style) -> bool {
        self.get_property(style, Pid::Visible)
            .map(|v| v.to_bool())
            .unwrap_or(true)
    }

    pub fn autoplace(&self, style: &Style) -> bool {
        self.get_property(style, Pid::Autoplace)
            .map(|v| v.to_bool())
            .unwrap_or(true)
    }
}

/// Defaults every element of a type shares
fn intrinsic_default(ty: ElementType, pid: Pid) -> Option<PropertyValue> {
    use PropertyValue as V;
    let v = match pid {
        Pid::Visible | Pid::Autoplace | Pid::Play | Pid::LineVisible => V::Bool(true),
        Pid::CreateSystemHeader | Pid::BoxAutosize | Pid::SingleNoteDynamics => V::Bool(true),
        Pid::Small
        | Pid::BeamNoSlope
        | Pid::ChordLineStraight
        | Pid::ChordLineWavy
        | Pid::HairpinCircledTip
        | Pid::SizeSpatiumDependent => V::Bool(false),
        Pid::Z => V::Int(ty.default_z()),
        Pid::Color => V::Color(Color::BLACK),
        Pid::Offset => V::Point(PointF::default()),
        Pid::Placement => V::Placement(ty.default_placement()),
        Pid::MinDistance => V::Spatium(0.0),
        Pid::TimeStretch | Pid::Mag | Pid::GrowLeft | Pid::GrowRight => V::Real(1.0),
        Pid::Direction | Pid::StemDirection | Pid::SlurDirection => V::Direction(DirectionV::Auto),
        Pid::StaffMove
        | Pid::Verse
        | Pid::AccidentalBracket
        | Pid::AccidentalRole
        | Pid::BarlineSpan
        | Pid::BarlineSpanFrom
        | Pid::BarlineSpanTo
        | Pid::VeloChange
        | Pid::HarmonyType
        | Pid::ArpeggioType
        | Pid::ArticulationAnchor
        | Pid::ChordLineType
        | Pid::GlissType
        | Pid::FontStyle => V::Int(0),
        Pid::Pause => V::Real(0.0),
        Pid::UserLen => V::Millimetre(0.0),
        Pid::Syllabic => V::name("single"),
        Pid::FretOffset | Pid::FretNumPos => V::Int(0),
        Pid::FretFrets => V::Int(4),
        Pid::FretStrings => V::Int(6),
        Pid::FretNut => V::Bool(true),
        Pid::Orientation => V::name("vertical"),
        Pid::TextStyle => V::name(ty.default_text_style()),
        Pid::FontFace => V::String("Edwin".to_string()),
        Pid::FontSize => V::Real(10.0),
        Pid::LineSpacing => V::Real(1.0),
        Pid::Align => V::name("left,baseline"),
        Pid::FrameType | Pid::FrameRound => V::Int(0),
        Pid::FramePadding => V::Spatium(0.2),
        Pid::FrameWidth => V::Spatium(0.1),
        Pid::FrameFgColor => V::Color(Color::BLACK),
        Pid::FrameBgColor => V::Color(Color::TRANSPARENT),
        Pid::LyricTicks => V::Fraction(Fraction::zero()),
        _ => return None,
    };
    Some(v)
}
