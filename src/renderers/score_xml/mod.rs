//! Score markup export
//!
//! Writes documents in the 4.x score markup and selections in its
//! clipboard form.
//!
//! # Module Structure
//!
//! - **document**: entry points (`write_document()`, `copy_selection()`) and the staff/measure/voice walk
//! - **dispatch**: element kind to writer
//! - **properties**: property writer and the common item block
//! - **links**: `linkedMain`/`linked` blocks for elements shared with parts
//! - **location**: absolute and relative element positions
//! - **chord**, **beam**, **lines**, **text**, **harmony**, **fret**, **items**: per-type writers
//! - **context**: per-pass state
//! - **builder**: markup sink

pub mod beam;
pub mod builder;
pub mod chord;
pub mod context;
pub mod dispatch;
pub mod document;
pub mod fret;
pub mod harmony;
pub mod items;
pub mod lines;
pub mod links;
pub mod location;
pub mod properties;
pub mod text;

pub use builder::XmlWriter;
pub use context::{ScoreRef, WriteContext};
pub use dispatch::write_element;
pub use document::{copy_selection, write_document, MSC_VERSION};
pub use location::Location;
