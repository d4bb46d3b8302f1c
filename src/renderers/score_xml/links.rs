//! Link tags for elements shared between linked scores
//!
//! The main element of a link group writes `linkedMain` and registers a
//! local index for its location. Every other member writes a `linked`
//! block: where the main element is, relative to this one, and how far the
//! main's index is from the index a reader will guess for it.

use crate::models::{Element, ElementRef, VOICES};

use super::builder::XmlWriter;
use super::context::{ScoreRef, WriteContext};
use super::location::Location;

pub fn write_link_tags(xml: &mut XmlWriter, ctx: &mut WriteContext, s: ScoreRef, e: &Element) {
    let Some(lid) = e.links else {
        return;
    };
    let Some(group) = s.doc.link_group(lid) else {
        return;
    };
    // copies must not stay linked to their source
    if group.len() <= 1 || ctx.clipboard_mode() {
        return;
    }
    if ctx.options().debug_mode {
        xml.tag("lid", lid.0);
    }
    let Some(main_ref) = group.main_element() else {
        return;
    };
    let Some((main_score, main)) = ScoreRef::new(s.doc, main_ref.score)
        .and_then(|ms| ms.element(main_ref.element).map(|m| (ms, m)))
    else {
        log::warn!("{}: main element of link group {} not found", e.type_name(), lid.0);
        return;
    };
    debug_assert_eq!(main.ty(), e.ty(), "link group members differ in type");

    let staff = e
        .staff_idx()
        .or_else(|| ctx.cur_track().map(|t| t / VOICES))
        .and_then(|idx| s.score.staff(idx));
    if staff.is_none() {
        log::warn!("linked element's staff not found ({})", e.type_name());
    }

    let mut loc = Location::position_for_element(s, e);

    if main_ref == ElementRef::new(s.idx, e.id) {
        xml.tag_empty("linkedMain");
        let index = ctx.assign_local_index(&loc);
        ctx.set_lid_local_index(lid, index);
        return;
    }

    // compare against the main's own staff numbering
    if let Some(main_staff) = staff
        .and_then(|st| st.links)
        .and_then(|slid| s.doc.staff_link_group(slid))
        .and_then(|g| g.main_element())
    {
        loc.staff = main_staff.staff as i32;
    }

    xml.start_element("linked");
    if !main_score.score.is_master {
        if main_ref.score == s.idx {
            xml.tag("score", "same");
        } else {
            log::warn!(
                "linked elements belong to different scores but none of them is master score: ({} lid={})",
                e.type_name(),
                lid.0
            );
        }
    }

    let mut main_loc = Location::position_for_element(main_score, main);
    let guessed = ctx.assign_local_index(&main_loc);
    if loc != main_loc {
        if let Err(err) = main_loc.to_relative(&loc) {
            ctx.record_overflow(err);
        }
        main_loc.write(xml);
    }
    let index_diff = ctx.lid_local_index(lid) - guessed;
    xml.tag_default("indexDiff", index_diff, 0);
    xml.end_element();
}
