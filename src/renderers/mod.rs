//! Renderers module
//!
//! Serialization of the score model into its persisted formats.

pub mod score_xml;

pub use score_xml::{copy_selection, write_document};
