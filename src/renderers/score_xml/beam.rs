// Beam writer
//
// Beams are regenerated by layout on load. Only user-modified fragment
// positions are persisted; regression passes also dump layout positions.

use crate::models::{BeamData, DirectionV, Element, Pid};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::properties::{write_item_properties, write_property};

pub fn write_beam(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element, b: &BeamData) {
    if b.elements.is_empty() {
        return;
    }
    xml.start_element(e.type_name());
    write_item_properties(xml, ctx, s, e);

    write_property(xml, s, e, Pid::StemDirection);
    write_property(xml, s, e, Pid::BeamNoSlope);
    write_property(xml, s, e, Pid::GrowLeft);
    write_property(xml, s, e, Pid::GrowRight);

    let idx = match b.direction {
        DirectionV::Auto | DirectionV::Down => 0,
        DirectionV::Up => 1,
    };
    let spatium = s.spatium();
    if b.user_modified {
        for f in &b.fragments {
            xml.start_element("Fragment");
            xml.tag("y1", f.py1[idx] / spatium);
            xml.tag("y2", f.py2[idx] / spatium);
            xml.end_element();
        }
    }

    // layout positions in 1/8 spatium, for regression comparisons
    if ctx.test_mode() {
        let spatium8 = spatium * 0.125;
        for f in &b.fragments {
            xml.tag("l1", (f.py1[idx] / spatium8).round() as i32);
            xml.tag("l2", (f.py2[idx] / spatium8).round() as i32);
        }
    }

    xml.end_element();
}
