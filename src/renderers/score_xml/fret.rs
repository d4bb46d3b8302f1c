//! Fret diagram writer
//!
//! A diagram is written twice in the same element: the per-string
//! `fretDiagram` block current readers use, and the flat single-dot,
//! boolean-barre layout older readers understand. Both are derived from the
//! same dots, markers and barres independently.

use crate::models::{Element, FretDiagram, Pid};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::dispatch::write_element;
use super::properties::{write_item_properties, write_property};

const FRET_PIDS: [Pid; 8] = [
    Pid::MinDistance,
    Pid::FretOffset,
    Pid::FretFrets,
    Pid::FretStrings,
    Pid::FretNut,
    Pid::Mag,
    Pid::FretNumPos,
    Pid::Orientation,
];

pub fn write_fret_diagram(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, fd: &FretDiagram) {
    if !ctx.can_write(e) {
        return;
    }
    xml.start_element(e.type_name());
    for pid in FRET_PIDS {
        write_property(xml, s, e, pid);
    }
    write_item_properties(xml, ctx, s, e);

    if let Some(harmony) = fd.harmony.and_then(|id| s.element(id)) {
        write_element(xml, ctx, s, harmony);
    }

    xml.start_element("fretDiagram");
    write_current_encoding(xml, fd);
    xml.end_element();

    write_legacy_encoding(xml, fd);
    xml.end_element();
}

/// Per-string markers and typed dots, then barres with explicit string range
pub fn write_current_encoding(xml: &mut XmlWriter, fd: &FretDiagram) {
    for i in 0..fd.strings {
        let marker = fd.marker(i);
        if !fd.has_dot_on(i) && marker.is_none() {
            continue;
        }
        xml.start_element_with("string", &[("no", i.to_string())]);
        if let Some(m) = marker {
            xml.tag("marker", m.mtype.xml_name());
        }
        for dot in fd.dots_on(i).filter(|d| d.exists()) {
            xml.tag_attrs("dot", &[("fret", dot.fret.to_string())], dot.dtype.xml_name());
        }
        xml.end_element();
    }

    for fret in 1..=fd.frets {
        if let Some(b) = fd.barre(fret) {
            xml.tag_attrs(
                "barre",
                &[("start", b.start_string.to_string()), ("end", b.end_string.to_string())],
                fret,
            );
        }
    }
}

/// Fret-only dots per string and a single boolean barre
///
/// The barre survives only if it sits at or below the lowest dotted fret,
/// reaches the last string, and does not start right of the left-most dot
/// on its own fret. Its start string gets an extra dot at the barre fret.
pub fn write_legacy_encoding(xml: &mut XmlWriter, fd: &FretDiagram) {
    let mut lowest_dot_fret = -1;
    let mut furthest_left_lowest_dot = -1;
    for i in 0..fd.strings {
        for dot in fd.dots_on(i).filter(|d| d.exists()) {
            if dot.fret < lowest_dot_fret || lowest_dot_fret == -1 {
                lowest_dot_fret = dot.fret;
                furthest_left_lowest_dot = i;
            } else if dot.fret == lowest_dot_fret && (i < furthest_left_lowest_dot || furthest_left_lowest_dot == -1) {
                furthest_left_lowest_dot = i;
            }
        }
    }

    let mut barre_start_string = -1;
    let mut barre_fret = -1;
    for b in fd.sorted_barres() {
        if b.fret <= lowest_dot_fret
            && b.reaches_last_string(fd.strings)
            && !(b.fret == lowest_dot_fret && b.start_string > furthest_left_lowest_dot)
        {
            barre_start_string = b.start_string;
            barre_fret = b.fret;
            break;
        }
    }

    for i in 0..fd.strings {
        let marker = fd.marker(i);
        if !fd.has_dot_on(i) && marker.is_none() && i != barre_start_string {
            continue;
        }
        xml.start_element_with("string", &[("no", i.to_string())]);
        if let Some(m) = marker {
            xml.tag("marker", m.mtype.legacy_char() as i32);
        }
        for dot in fd.dots_on(i).filter(|d| d.exists()) {
            if !(i == barre_start_string && dot.fret == barre_fret) {
                xml.tag("dot", dot.fret);
            }
        }
        if i == barre_start_string {
            xml.tag("dot", barre_fret);
        }
        xml.end_element();
    }

    if barre_fret > 0 {
        xml.tag("barre", 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FretDotType, FretMarkerType};

    #[test]
    fn test_current_encoding_layout() {
        let fd = FretDiagram::new(6, 5)
            .add_marker(5, FretMarkerType::Cross)
            .add_dot(1, 2, FretDotType::Triangle)
            .add_barre(1, 0, -1);
        let mut xml = XmlWriter::new();
        write_current_encoding(&mut xml, &fd);
        let out = xml.finish();
        assert!(out.contains("<string no=\"1\">\n  <dot fret=\"2\">triangle</dot>\n</string>"));
        assert!(out.contains("<string no=\"5\">\n  <marker>cross</marker>\n</string>"));
        assert!(out.contains("<barre start=\"0\" end=\"-1\">1</barre>"));
    }

    #[test]
    fn test_legacy_barre_needs_lowest_fret() {
        // barre above the lowest dot is dropped from the legacy layout
        let fd = FretDiagram::new(6, 5)
            .add_dot(2, 1, FretDotType::Normal)
            .add_barre(3, 0, -1);
        let mut xml = XmlWriter::new();
        write_legacy_encoding(&mut xml, &fd);
        let out = xml.finish();
        assert!(!out.contains("<barre>"));
        assert!(out.contains("<string no=\"2\">\n  <dot>1</dot>\n</string>"));
    }

    #[test]
    fn test_legacy_marker_is_char_code() {
        let fd = FretDiagram::new(6, 5).add_marker(0, FretMarkerType::Circle);
        let mut xml = XmlWriter::new();
        write_legacy_encoding(&mut xml, &fd);
        assert!(xml.finish().contains("<marker>79</marker>"));
    }

    #[test]
    fn test_legacy_barre_right_of_lowest_dot_is_dropped() {
        let fd = FretDiagram::new(6, 5)
            .add_dot(0, 1, FretDotType::Normal)
            .add_barre(1, 2, -1);
        let mut xml = XmlWriter::new();
        write_legacy_encoding(&mut xml, &fd);
        assert!(!xml.finish().contains("<barre>"));
    }
}
