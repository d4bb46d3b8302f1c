//! Score Writer WASM Module
//!
//! Persists scores in the 4.x score markup: full documents with their
//! linked parts, and clipboard copies of a staff/tick selection.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod renderers;

// Re-export commonly used types
pub use config::{SelectionFilter, WriteOptions};
pub use error::{WriteError, WriteResult};
pub use models::{Document, Element, ElementData, Fraction, Score};
pub use renderers::{copy_selection, write_document};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // fails only when a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Score writer WASM module initialized");
}
