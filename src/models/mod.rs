//! Score document model
//!
//! The read-only graph the writer walks: documents, scores, staves,
//! measures and elements, plus the property model each element carries.

pub mod element;
pub mod fraction;
pub mod fret;
pub mod interval;
pub mod items;
pub mod pid;
pub mod score;
pub mod style;
pub mod value;

pub use element::*;
pub use fraction::*;
pub use fret::*;
pub use interval::Interval;
pub use items::*;
pub use pid::*;
pub use score::*;
pub use style::Style;
pub use value::*;
