//! Fret diagram content: per-string dots and markers, per-fret barres

use serde::{Deserialize, Serialize};

use super::element::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FretDotType {
    #[default]
    Normal,
    Cross,
    Square,
    Triangle,
}

impl FretDotType {
    pub fn xml_name(self) -> &'static str {
        match self {
            FretDotType::Normal => "normal",
            FretDotType::Cross => "cross",
            FretDotType::Square => "square",
            FretDotType::Triangle => "triangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FretMarkerType {
    #[default]
    None,
    Circle,
    Cross,
}

impl FretMarkerType {
    pub fn xml_name(self) -> &'static str {
        match self {
            FretMarkerType::None => "none",
            FretMarkerType::Circle => "circle",
            FretMarkerType::Cross => "cross",
        }
    }

    /// Character used by the pre-3.1 encoding
    pub fn legacy_char(self) -> char {
        match self {
            FretMarkerType::None => ' ',
            FretMarkerType::Circle => 'O',
            FretMarkerType::Cross => 'X',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretDot {
    pub string: i32,
    pub fret: i32,
    #[serde(default)]
    pub dtype: FretDotType,
}

impl FretDot {
    /// Fret 0 marks an empty slot
    pub fn exists(&self) -> bool {
        self.fret > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretMarker {
    pub string: i32,
    pub mtype: FretMarkerType,
}

impl FretMarker {
    pub fn exists(&self) -> bool {
        self.mtype != FretMarkerType::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretBarre {
    pub fret: i32,
    pub start_string: i32,
    /// -1 extends the barre to the last string
    #[serde(default = "FretBarre::to_last")]
    pub end_string: i32,
}

impl FretBarre {
    fn to_last() -> i32 {
        -1
    }

    pub fn exists(&self) -> bool {
        self.start_string > -1
    }

    /// Whether the barre reaches the highest-numbered string
    pub fn reaches_last_string(&self, strings: i32) -> bool {
        self.end_string == -1 || self.end_string == strings - 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FretDiagram {
    pub strings: i32,
    pub frets: i32,
    #[serde(default)]
    pub dots: Vec<FretDot>,
    #[serde(default)]
    pub markers: Vec<FretMarker>,
    #[serde(default)]
    pub barres: Vec<FretBarre>,
    /// Chord symbol attached to the diagram
    #[serde(default)]
    pub harmony: Option<ElementId>,
}

impl FretDiagram {
    pub fn new(strings: i32, frets: i32) -> Self {
        Self {
            strings,
            frets,
            dots: Vec::new(),
            markers: Vec::new(),
            barres: Vec::new(),
            harmony: None,
        }
    }

    pub fn add_dot(mut self, string: i32, fret: i32, dtype: FretDotType) -> Self {
        self.dots.push(FretDot { string, fret, dtype });
        self
    }

    pub fn add_marker(mut self, string: i32, mtype: FretMarkerType) -> Self {
        self.markers.retain(|m| m.string != string);
        self.markers.push(FretMarker { string, mtype });
        self
    }

    pub fn add_barre(mut self, fret: i32, start_string: i32, end_string: i32) -> Self {
        self.barres.retain(|b| b.fret != fret);
        self.barres.push(FretBarre { fret, start_string, end_string });
        self
    }

    /// Dots on one string, in insertion order
    pub fn dots_on(&self, string: i32) -> impl Iterator<Item = &FretDot> {
        self.dots.iter().filter(move |d| d.string == string)
    }

    pub fn has_dot_on(&self, string: i32) -> bool {
        self.dots_on(string).any(|d| d.exists())
    }

    pub fn marker(&self, string: i32) -> Option<&FretMarker> {
        self.markers.iter().find(|m| m.string == string && m.exists())
    }

    pub fn barre(&self, fret: i32) -> Option<&FretBarre> {
        self.barres.iter().find(|b| b.fret == fret && b.exists())
    }

    /// Existing barres ordered by fret
    pub fn sorted_barres(&self) -> Vec<&FretBarre> {
        let mut barres: Vec<&FretBarre> = self.barres.iter().filter(|b| b.exists()).collect();
        barres.sort_by_key(|b| b.fret);
        barres
    }
}
