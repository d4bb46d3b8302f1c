// Score markup sink
//
// Append-only writer with a stack of open elements. Values are escaped on
// the way in; raw markup (rich text) goes through `write_xml`.

use quick_xml::escape::escape;

use crate::models::{Fraction, PointF, PropertyValue};

/// Values that can be written as tag content or attribute values
pub trait XmlValue {
    fn to_xml(&self) -> String;
}

impl XmlValue for i32 {
    fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl XmlValue for u32 {
    fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl XmlValue for usize {
    fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl XmlValue for f64 {
    fn to_xml(&self) -> String {
        format_real(*self)
    }
}

impl XmlValue for bool {
    fn to_xml(&self) -> String {
        if *self { "1".to_string() } else { "0".to_string() }
    }
}

impl XmlValue for &str {
    fn to_xml(&self) -> String {
        escape(*self).into_owned()
    }
}

impl XmlValue for String {
    fn to_xml(&self) -> String {
        escape(self.as_str()).into_owned()
    }
}

impl XmlValue for Fraction {
    fn to_xml(&self) -> String {
        self.to_string()
    }
}

/// Format a real the way the file format expects: at most six significant
/// digits, no trailing zeros
pub fn format_real(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    let decimals = (5 - exp).max(0) as usize;
    let mut s = format!("{:.*}", decimals, v);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Attribute list for tags that carry attributes
pub type Attrs<'a> = &'a [(&'a str, String)];

fn attrs_to_string(attrs: Attrs) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, escape(v.as_str())))
        .collect()
}

/// Markup writer for score files
pub struct XmlWriter {
    buffer: String,
    stack: Vec<&'static str>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self { buffer: String::new(), stack: Vec::new() }
    }

    /// Write the XML declaration
    pub fn header(&mut self) {
        self.buffer.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.buffer.push_str("  ");
        }
    }

    fn line(&mut self, content: &str) {
        self.indent();
        self.buffer.push_str(content);
        self.buffer.push('\n');
    }

    /// Depth of currently open elements
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn start_element(&mut self, name: &'static str) {
        self.line(&format!("<{}>", name));
        self.stack.push(name);
    }

    pub fn start_element_with(&mut self, name: &'static str, attrs: Attrs) {
        self.line(&format!("<{}{}>", name, attrs_to_string(attrs)));
        self.stack.push(name);
    }

    /// Close the innermost open element
    ///
    /// Closing with nothing open is a writer bug.
    pub fn end_element(&mut self) {
        match self.stack.pop() {
            Some(name) => self.line(&format!("</{}>", name)),
            None => {
                debug_assert!(false, "end_element without open element");
                log::error!("XmlWriter: end_element without open element");
            }
        }
    }

    /// `<name/>`
    pub fn tag_empty(&mut self, name: &str) {
        self.line(&format!("<{}/>", name));
    }

    /// `<name a="..."/>`
    pub fn tag_empty_with(&mut self, name: &str, attrs: Attrs) {
        self.line(&format!("<{}{}/>", name, attrs_to_string(attrs)));
    }

    pub fn tag<V: XmlValue>(&mut self, name: &str, value: V) {
        let v = value.to_xml();
        self.line(&format!("<{}>{}</{}>", name, v, name));
    }

    /// Write the tag unless `value` equals `default`
    pub fn tag_default<V: XmlValue + PartialEq>(&mut self, name: &str, value: V, default: V) {
        if value != default {
            self.tag(name, value);
        }
    }

    pub fn tag_attrs<V: XmlValue>(&mut self, name: &str, attrs: Attrs, value: V) {
        let v = value.to_xml();
        self.line(&format!("<{}{}>{}</{}>", name, attrs_to_string(attrs), v, name));
    }

    /// Fraction as `n/d`, suppressed when equal to `default`
    pub fn tag_fraction(&mut self, name: &str, value: Fraction, default: Option<Fraction>) {
        if default != Some(value) {
            self.tag(name, value);
        }
    }

    pub fn tag_point(&mut self, name: &str, p: PointF) {
        self.tag_empty_with(name, &[("x", format_real(p.x)), ("y", format_real(p.y))]);
    }

    /// Write a typed property value, suppressed when equal to `default`
    pub fn tag_property(&mut self, name: &str, value: &PropertyValue, default: Option<&PropertyValue>) {
        if default.is_some_and(|d| d.same_value(value)) {
            return;
        }
        match value {
            PropertyValue::Bool(b) => self.tag(name, *b),
            PropertyValue::Int(i) => self.tag(name, *i),
            PropertyValue::Real(r) | PropertyValue::Spatium(r) | PropertyValue::Millimetre(r) => {
                self.tag(name, *r)
            }
            PropertyValue::Point(p) => self.tag_point(name, *p),
            PropertyValue::Color(c) => self.tag_empty_with(
                name,
                &[
                    ("r", c.r.to_string()),
                    ("g", c.g.to_string()),
                    ("b", c.b.to_string()),
                    ("a", c.a.to_string()),
                ],
            ),
            PropertyValue::String(s) | PropertyValue::Name(s) => self.tag(name, s.as_str()),
            PropertyValue::Fraction(f) => self.tag(name, *f),
            PropertyValue::Direction(d) => self.tag(name, d.xml_name()),
            PropertyValue::Placement(p) => self.tag(name, p.xml_name()),
        }
    }

    /// Write already-formatted markup as the content of `name`
    pub fn write_xml(&mut self, name: &str, markup: &str) {
        self.line(&format!("<{}>{}</{}>", name, markup, name));
    }

    /// Close the pass and return the markup
    ///
    /// Elements still open at this point are a writer bug.
    pub fn finish(mut self) -> String {
        if !self.stack.is_empty() {
            debug_assert!(false, "unclosed elements: {:?}", self.stack);
            log::error!("XmlWriter: unclosed elements {:?}", self.stack);
            while !self.stack.is_empty() {
                self.end_element();
            }
        }
        self.buffer
    }

    /// Markup written so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;

    #[test]
    fn test_nesting_and_indent() {
        let mut xml = XmlWriter::new();
        xml.start_element("Chord");
        xml.tag("durationType", "quarter");
        xml.end_element();
        assert_eq!(xml.finish(), "<Chord>\n  <durationType>quarter</durationType>\n</Chord>\n");
    }

    #[test]
    fn test_default_suppression() {
        let mut xml = XmlWriter::new();
        xml.tag_default("indexDiff", 0, 0);
        xml.tag_default("indexDiff", 2, 0);
        assert_eq!(xml.finish(), "<indexDiff>2</indexDiff>\n");
    }

    #[test]
    fn test_escaping() {
        let mut xml = XmlWriter::new();
        xml.tag("name", "a<b & c");
        assert!(xml.finish().contains("a&lt;b &amp; c"));
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0), "1");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(-2.25), "-2.25");
        assert_eq!(format_real(1.0 / 3.0), "0.333333");
        assert_eq!(format_real(123.4567891), "123.457");
        assert_eq!(format_real(-0.0), "0");
    }

    #[test]
    fn test_color_property() {
        let mut xml = XmlWriter::new();
        xml.tag_property("color", &PropertyValue::Color(Color::rgb(255, 0, 0)), None);
        assert_eq!(xml.finish(), "<color r=\"255\" g=\"0\" b=\"0\" a=\"255\"/>\n");
    }

    #[test]
    fn test_property_default_matches_across_units() {
        let mut xml = XmlWriter::new();
        xml.tag_property("minDistance", &PropertyValue::Real(1.0), Some(&PropertyValue::Spatium(1.0)));
        xml.tag_property("lineWidth", &PropertyValue::Spatium(0.16), Some(&PropertyValue::Real(0.15)));
        assert_eq!(xml.finish(), "<lineWidth>0.16</lineWidth>\n");
    }

    #[test]
    #[should_panic]
    fn test_unbalanced_end_panics_in_debug() {
        let mut xml = XmlWriter::new();
        xml.end_element();
    }
}
