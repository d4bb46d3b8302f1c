//! Typed property values

use serde::{Deserialize, Serialize};
use std::ops::Div;

use super::fraction::Fraction;

/// 2D point in raster units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Div<f64> for PointF {
    type Output = PointF;
    fn div(self, rhs: f64) -> PointF {
        PointF::new(self.x / rhs, self.y / rhs)
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 255, g: 255, b: 255, a: 0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Vertical direction (stems, slurs, articulations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionV {
    #[default]
    Auto,
    Up,
    Down,
}

impl DirectionV {
    pub fn xml_name(self) -> &'static str {
        match self {
            DirectionV::Auto => "auto",
            DirectionV::Up => "up",
            DirectionV::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementV {
    Above,
    Below,
}

impl PlacementV {
    pub fn xml_name(self) -> &'static str {
        match self {
            PlacementV::Above => "above",
            PlacementV::Below => "below",
        }
    }
}

/// Font style bitmask; persisted as independent boolean tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle(pub i32);

impl FontStyle {
    pub const BOLD: i32 = 1;
    pub const ITALIC: i32 = 2;
    pub const UNDERLINE: i32 = 4;
    pub const STRIKE: i32 = 8;

    /// (tag, bit) pairs in write order
    pub const FLAGS: [(&'static str, i32); 4] = [
        ("bold", FontStyle::BOLD),
        ("italic", FontStyle::ITALIC),
        ("underline", FontStyle::UNDERLINE),
        ("strike", FontStyle::STRIKE),
    ];

    pub fn has(self, bit: i32) -> bool {
        self.0 & bit != 0
    }
}

/// A property value as stored on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Real(f64),
    Spatium(f64),
    Millimetre(f64),
    Point(PointF),
    Color(Color),
    String(String),
    Fraction(Fraction),
    Direction(DirectionV),
    Placement(PlacementV),
    Name(String),
}

impl PropertyValue {
    pub fn to_bool(&self) -> bool {
        match self {
            PropertyValue::Bool(b) => *b,
            PropertyValue::Int(i) => *i != 0,
            _ => false,
        }
    }

    pub fn to_int(&self) -> i32 {
        match self {
            PropertyValue::Int(i) => *i,
            PropertyValue::Bool(b) => *b as i32,
            PropertyValue::Real(r) | PropertyValue::Spatium(r) | PropertyValue::Millimetre(r) => *r as i32,
            _ => 0,
        }
    }

    pub fn to_real(&self) -> f64 {
        match self {
            PropertyValue::Real(r) | PropertyValue::Spatium(r) | PropertyValue::Millimetre(r) => *r,
            PropertyValue::Int(i) => *i as f64,
            _ => 0.0,
        }
    }

    pub fn to_point(&self) -> PointF {
        match self {
            PropertyValue::Point(p) => *p,
            _ => PointF::default(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Name(s) => Some(s),
            _ => None,
        }
    }

    pub fn name(s: &str) -> Self {
        PropertyValue::Name(s.to_string())
    }

    /// Equality that ignores which real-valued unit a number is stored as
    pub fn same_value(&self, other: &PropertyValue) -> bool {
        use PropertyValue::{Millimetre, Name, Real, Spatium, String as Str};
        match (self, other) {
            (Real(a) | Spatium(a) | Millimetre(a), Real(b) | Spatium(b) | Millimetre(b)) => a == b,
            (Str(a) | Name(a), Str(b) | Name(b)) => a == b,
            _ => self == other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_bits() {
        let fs = FontStyle(FontStyle::BOLD | FontStyle::STRIKE);
        assert!(fs.has(FontStyle::BOLD));
        assert!(!fs.has(FontStyle::ITALIC));
        assert!(fs.has(FontStyle::STRIKE));
    }

    #[test]
    fn test_same_value_across_real_units() {
        assert!(PropertyValue::Real(1.0).same_value(&PropertyValue::Spatium(1.0)));
        assert!(PropertyValue::Millimetre(0.5).same_value(&PropertyValue::Real(0.5)));
        assert!(!PropertyValue::Spatium(1.0).same_value(&PropertyValue::Spatium(1.5)));
        assert!(PropertyValue::name("single").same_value(&PropertyValue::String("single".into())));
        assert!(!PropertyValue::Int(1).same_value(&PropertyValue::Real(1.0)));
    }

    #[test]
    fn test_value_json_shape() {
        let v = PropertyValue::Point(PointF::new(1.0, -2.0));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"type":"point","value":{"x":1.0,"y":-2.0}}"#);
    }
}
