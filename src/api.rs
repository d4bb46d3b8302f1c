//! WASM API for the score writer
//!
//! JavaScript hands over a document once with `loadDocument`, then asks for
//! full saves or clipboard copies of it. The document lives in WASM memory
//! between calls.

use lazy_static::lazy_static;
use std::sync::Mutex;
use wasm_bindgen::prelude::*;

use crate::config::WriteOptions;
use crate::error::{WriteError, WriteResult};
use crate::models::{Document, Fraction};
use crate::renderers;

// WASM-owned document storage
lazy_static! {
    static ref DOCUMENT: Mutex<Option<Document>> = Mutex::new(None);
}

fn with_document<T>(f: impl FnOnce(&Document) -> WriteResult<T>) -> WriteResult<T> {
    let guard = DOCUMENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let doc = guard.as_ref().ok_or(WriteError::NoDocument)?;
    f(doc)
}

fn parse_options(json: Option<&str>) -> WriteResult<WriteOptions> {
    match json {
        Some(json) if !json.trim().is_empty() => WriteOptions::from_json(json),
        _ => Ok(WriteOptions::default()),
    }
}

fn to_js(err: WriteError) -> JsValue {
    log::error!("{}", err);
    JsValue::from_str(&err.to_string())
}

/// Options handed over as a plain JS object
fn options_from_js(value: JsValue) -> Result<WriteOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(WriteOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("Invalid write options: {}", e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Replace the stored document; returns the number of scores loaded
pub fn load_document_json(json: &str) -> WriteResult<usize> {
    let doc = Document::from_json(json)?;
    let count = doc.scores.len();
    let mut guard = DOCUMENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(doc);
    log::info!("document loaded: {} score(s)", count);
    Ok(count)
}

pub fn save_document_json(options_json: Option<&str>) -> WriteResult<String> {
    let options = parse_options(options_json)?;
    with_document(|doc| renderers::write_document(doc, &options))
}

/// Clipboard copy; ticks count 480 per quarter note
pub fn copy_selection_json(
    score: usize,
    staff_start: usize,
    staff_end: usize,
    tick_start: i32,
    tick_end: i32,
    options_json: Option<&str>,
) -> WriteResult<String> {
    let options = parse_options(options_json)?;
    with_document(|doc| {
        renderers::copy_selection(
            doc,
            score,
            staff_start..staff_end,
            Fraction::from_ticks(tick_start),
            Fraction::from_ticks(tick_end),
            &options,
        )
    })
}

#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(json: &str) -> Result<usize, JsValue> {
    load_document_json(json).map_err(to_js)
}

/// Write the stored document; `options_json` may be empty
#[wasm_bindgen(js_name = saveDocument)]
pub fn save_document(options_json: Option<String>) -> Result<String, JsValue> {
    save_document_json(options_json.as_deref()).map_err(to_js)
}

/// Same as `saveDocument`, with the options as an object
#[wasm_bindgen(js_name = saveDocumentWithOptions)]
pub fn save_document_with_options(options: JsValue) -> Result<String, JsValue> {
    let options = options_from_js(options)?;
    with_document(|doc| renderers::write_document(doc, &options)).map_err(to_js)
}

/// Default options as an object, for callers building their own
#[wasm_bindgen(js_name = defaultWriteOptions)]
pub fn default_write_options() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&WriteOptions::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(js_name = copySelection)]
pub fn copy_selection(
    score: usize,
    staff_start: usize,
    staff_end: usize,
    tick_start: i32,
    tick_end: i32,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    copy_selection_json(score, staff_start, staff_end, tick_start, tick_end, options_json.as_deref()).map_err(to_js)
}
