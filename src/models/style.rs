//! Document style sheet
//!
//! Holds the values styled properties fall back to, plus the few global
//! switches the write path consults.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;

use super::pid::Sid;
use super::value::PropertyValue;

fn enabled() -> Cell<bool> {
    Cell::new(true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Global autoplace toggle. Held in a `Cell` so a writer can flip it for
    /// the duration of one property write through a shared reference.
    #[serde(default = "enabled")]
    autoplace_enabled: Cell<bool>,

    #[serde(default)]
    pub concert_pitch: bool,

    #[serde(default)]
    pub values: BTreeMap<Sid, PropertyValue>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            autoplace_enabled: enabled(),
            concert_pitch: false,
            values: BTreeMap::new(),
        }
    }
}

impl Style {
    pub fn autoplace_enabled(&self) -> bool {
        self.autoplace_enabled.get()
    }

    pub fn set_autoplace_enabled(&self, enabled: bool) {
        self.autoplace_enabled.set(enabled);
    }

    pub fn value(&self, sid: Sid) -> Option<&PropertyValue> {
        self.values.get(&sid)
    }

    pub fn set(&mut self, sid: Sid, value: PropertyValue) {
        self.values.insert(sid, value);
    }
}
