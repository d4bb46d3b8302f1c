//! Elements left at their defaults carry no instance-level property tags

mod common;

use common::{add_chord, quarter_chord, score};
use pretty_assertions::assert_eq;
use score_writer_wasm::models::{
    Document, Element, ElementData, FretDiagram, Fraction, HairpinData, Pid, PropertyFlags, PropertyValue, Score,
    Sid, SpannerData,
};
use score_writer_wasm::renderers::score_xml::properties::{
    write_item_properties, write_styled_properties, write_unstyled_properties,
};
use score_writer_wasm::renderers::score_xml::{ScoreRef, WriteContext, XmlWriter};
use score_writer_wasm::{write_document, WriteOptions};

const INSTANCE_TAGS: [&str; 8] = [
    "<offset", "<color", "<visible>", "<z>", "<placement>", "<autoplace>", "<minDistance>", "<lineWidth>",
];

fn untouched_elements(score: &mut Score) {
    score.style.set(Sid::HairpinMinDistance, PropertyValue::Real(0.5));
    score.add(quarter_chord(0, Fraction::zero()));
    score.add(
        Element::new(ElementData::Hairpin(HairpinData {
            hairpin_type: 0,
            line: SpannerData { ticks: Fraction::new(1, 2), ..Default::default() },
        }))
        .at(0, Fraction::zero())
        .styled(Pid::LineWidth, Sid::HairpinLineWidth)
        .styled(Pid::Placement, Sid::HairpinPlacement)
        // reset to the style value, stored in another real unit
        .styled(Pid::MinDistance, Sid::HairpinMinDistance)
        .with_flags(Pid::MinDistance, PropertyValue::Spatium(0.5), PropertyFlags::Unstyled),
    );
    score.add(
        Element::new(ElementData::FretDiagram(FretDiagram::new(6, 4)))
            .at(0, Fraction::zero())
            .styled(Pid::Mag, Sid::FretMag)
            .styled(Pid::MinDistance, Sid::FretMinDistance),
    );
    score.add(
        Element::new(ElementData::Text { text: "Allegro".to_string() })
            .at(0, Fraction::zero())
            .styled(Pid::FontSize, Sid::StaffTextFontSize)
            .styled(Pid::Placement, Sid::StaffTextPlacement),
    );
}

#[test]
fn test_property_blocks_empty_for_untouched_elements() {
    let mut score = score(1, 1);
    untouched_elements(&mut score);
    let doc = Document::new(score);
    let s = ScoreRef::new(&doc, 0).unwrap();

    for e in &s.score.elements {
        let mut ctx = WriteContext::new(WriteOptions::default());
        ctx.set_cur_track(e.track);
        let mut xml = XmlWriter::new();
        write_item_properties(&mut xml, &mut ctx, s, e);
        write_styled_properties(&mut xml, s, e);
        write_unstyled_properties(&mut xml, s, e);
        assert_eq!(xml.finish(), "", "{} wrote instance properties", e.type_name());
    }
}

#[test]
fn test_saved_chord_has_only_structural_tags() {
    let mut score = score(1, 1);
    add_chord(&mut score, 0, Fraction::zero(), 60);
    let out = write_document(&Document::new(score), &WriteOptions::default()).unwrap();
    assert!(out.contains("<Chord>"));
    assert!(out.contains("<Note>"));
    for tag in INSTANCE_TAGS {
        assert!(!out.contains(tag), "unexpected {} in\n{}", tag, out);
    }
}
