//! Property identifiers and their persisted names
//!
//! Every property an element can carry is addressed by a stable [`Pid`].
//! The XML tag name and the value type of each property are fixed here;
//! both are part of the file format.

use serde::{Deserialize, Serialize};

/// Value type of a property, as far as the write path cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Bool,
    Int,
    Real,
    /// Already spatium-relative
    Spatium,
    /// Physical length, converted to spatium units on write
    Millimetre,
    /// Offset, scaled by spatium or device resolution on write
    Point,
    Color,
    String,
    Fraction,
    Direction,
    Placement,
    /// Bold/italic/underline/strike bitmask
    FontStyle,
    /// Enumerations persisted by name
    Name,
}

/// Where the value of a property comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyFlags {
    /// Governed by the style sheet; never written per instance
    Styled,
    /// Style-backed property overridden on this instance
    Unstyled,
    /// No style backing at all
    NoStyle,
}

macro_rules! pids {
    ($($variant:ident => ($name:literal, $ty:ident)),* $(,)?) => {
        /// Stable property key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Pid {
            $($variant,)*
        }

        impl Pid {
            /// Tag name used in the persisted format
            pub fn xml_name(self) -> &'static str {
                match self {
                    $(Pid::$variant => $name,)*
                }
            }

            pub fn property_type(self) -> PropertyType {
                match self {
                    $(Pid::$variant => PropertyType::$ty,)*
                }
            }
        }
    };
}

pids! {
    Visible => ("visible", Bool),
    Z => ("z", Int),
    Color => ("color", Color),
    Offset => ("offset", Point),
    Placement => ("placement", Placement),
    Autoplace => ("autoplace", Bool),
    MinDistance => ("minDistance", Spatium),
    Position => ("position", Fraction),
    Small => ("small", Bool),
    Play => ("play", Bool),
    TimeStretch => ("timeStretch", Real),
    Mag => ("mag", Real),
    Direction => ("direction", Direction),
    StemDirection => ("StemDirection", Direction),
    SlurDirection => ("up", Direction),
    StaffMove => ("staffMove", Int),

    AccidentalBracket => ("bracket", Int),
    AccidentalRole => ("role", Int),
    AccidentalType => ("subtype", Name),

    HeadGroup => ("head", Int),
    HeadType => ("headType", Int),
    MirrorHead => ("mirror", Int),
    LineWidthSpatium => ("lineWidth", Spatium),

    ArpeggioType => ("subtype", Int),
    OrnamentStyle => ("ornamentStyle", Name),
    ArticulationAnchor => ("anchor", Int),

    BarlineType => ("subtype", Name),
    BarlineSpan => ("span", Int),
    BarlineSpanFrom => ("spanFromOffset", Int),
    BarlineSpanTo => ("spanToOffset", Int),

    BeamNoSlope => ("noSlope", Bool),
    GrowLeft => ("growLeft", Real),
    GrowRight => ("growRight", Real),

    BendLineWidth => ("lineWidth", Millimetre),
    BendFontSize => ("fontSize", Real),

    BoxHeight => ("height", Spatium),
    BoxWidth => ("width", Spatium),
    TopGap => ("topGap", Millimetre),
    BottomGap => ("bottomGap", Millimetre),
    LeftMargin => ("leftMargin", Real),
    RightMargin => ("rightMargin", Real),
    TopMargin => ("topMargin", Real),
    BottomMargin => ("bottomMargin", Real),
    BoxAutosize => ("boxAutoSize", Bool),
    CreateSystemHeader => ("createSystemHeader", Bool),

    Symbol => ("symbol", Name),
    Pause => ("pause", Real),

    ChordLineType => ("subtype", Int),
    ChordLineStraight => ("straight", Bool),
    ChordLineWavy => ("wavy", Bool),

    ClefTypeConcert => ("concertClefType", Name),
    ClefTypeTransposing => ("transposingClefType", Name),

    DynamicType => ("subtype", Name),
    Velocity => ("velocity", Int),
    DynamicRange => ("dynType", Int),
    VeloChange => ("veloChange", Int),
    VeloChangeSpeed => ("veloChangeSpeed", Name),
    VeloChangeMethod => ("veloChangeMethod", Name),

    TextStyle => ("style", Name),
    FontFace => ("family", String),
    FontSize => ("size", Real),
    FontStyle => ("fontStyle", FontStyle),
    LineSpacing => ("lineSpacing", Real),
    SizeSpatiumDependent => ("sizeIsSpatiumDependent", Bool),
    Align => ("align", Name),
    FrameType => ("frameType", Int),
    FrameWidth => ("frameWidth", Spatium),
    FramePadding => ("framePadding", Spatium),
    FrameRound => ("frameRound", Int),
    FrameFgColor => ("frameFgColor", Color),
    FrameBgColor => ("frameBgColor", Color),

    FretOffset => ("fretOffset", Int),
    FretFrets => ("frets", Int),
    FretStrings => ("strings", Int),
    FretNut => ("showNut", Bool),
    FretNumPos => ("fretNumPos", Int),
    Orientation => ("orientation", Name),

    GlissType => ("subtype", Int),
    GlissStyle => ("glissandoStyle", Name),
    GlissEaseIn => ("easeInSpin", Int),
    GlissEaseOut => ("easeOutSpin", Int),

    LineWidth => ("lineWidth", Millimetre),
    LineStyle => ("lineStyle", Name),
    Anchor => ("anchor", Name),
    DashLineLen => ("dashLineLength", Real),
    DashGapLen => ("dashGapLength", Real),
    LineVisible => ("lineVisible", Bool),

    BeginHookType => ("beginHookType", Name),
    BeginHookHeight => ("beginHookHeight", Spatium),
    EndHookType => ("endHookType", Name),
    EndHookHeight => ("endHookHeight", Spatium),
    BeginText => ("beginText", String),
    BeginTextPlace => ("beginTextPlace", Name),
    BeginFontFace => ("beginFontFace", String),
    BeginFontSize => ("beginFontSize", Real),
    BeginFontStyle => ("beginFontStyle", Int),
    BeginTextOffset => ("beginTextOffset", Point),
    ContinueText => ("continueText", String),
    ContinueTextPlace => ("continueTextPlace", Name),
    EndText => ("endText", String),
    EndTextPlace => ("endTextPlace", Name),

    TempoChangeType => ("tempoChangeType", Name),
    TempoEasingMethod => ("tempoEasingMethod", Name),
    TempoChangeFactor => ("tempoChangeFactor", Real),

    HairpinCircledTip => ("hairpinCircledTip", Bool),
    SingleNoteDynamics => ("singleNoteDynamics", Bool),

    HarmonyType => ("harmonyType", Int),

    Pitch => ("pitch", Int),
    Tpc1 => ("tpc", Int),
    Tpc2 => ("tpc2", Int),
    UserLen => ("userLen", Millimetre),
    TremoloType => ("subtype", Name),
    Verse => ("no", Int),
    Syllabic => ("syllabic", Name),
    LyricTicks => ("ticks_f", Fraction),
}

/// Style sheet keys referenced by styled properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sid {
    ArticulationMinDistance,
    ArticulationAnchor,
    ArpeggioLineWidth,
    BendLineWidth,
    BendFontSize,
    DynamicsFontFace,
    DynamicsFontSize,
    DynamicsFontStyle,
    DynamicsPlacement,
    DynamicsMinDistance,
    FermataMinDistance,
    FingeringFontSize,
    FingeringPlacement,
    FretMag,
    FretPlacement,
    FretStrings,
    FretFrets,
    FretNut,
    FretMinDistance,
    FretNumPos,
    FretOrientation,
    GlissandoLineWidth,
    GlissandoText,
    HairpinLineWidth,
    HairpinPlacement,
    HairpinMinDistance,
    HairpinHeight,
    HarmonyPlacement,
    HarmonyFontSize,
    HarmonyMinDistance,
    LyricsFontSize,
    StaffTextFontSize,
    StaffTextPlacement,
    TempoChangeLineWidth,
    TempoChangePlacement,
    TextFontFace,
    TextFontSize,
    TextFontStyle,
    TextAlign,
    TextFrameType,
}
