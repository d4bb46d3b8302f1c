//! Write pass options
//!
//! Options are plain serde structs so they can be handed over from
//! JavaScript as JSON or kept next to fixtures as YAML.
//!
//! ```yaml
//! test_mode: false
//! write_track: false
//! filter:
//!   voices: [0, 1]
//!   excluded_types: [Fingering]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WriteResult;
use crate::models::{Element, ElementType};

/// Pass-level switches consulted by the element writers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Regression pass: beams are always written, with layout positions
    pub test_mode: bool,
    /// Write link ids next to link blocks
    pub debug_mode: bool,
    /// Write `track` on every element instead of only on track changes
    pub write_track: bool,
    /// Write each element's measure-relative `position`
    pub write_position: bool,
    /// Consulted while copying a selection
    pub filter: SelectionFilter,
}

impl WriteOptions {
    pub fn from_yaml(yaml: &str) -> WriteResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> WriteResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> WriteResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }
}

/// Which content a clipboard copy keeps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionFilter {
    /// Voices to keep; empty keeps every voice
    pub voices: Vec<usize>,
    /// Element types left out of the copy
    pub excluded_types: Vec<ElementType>,
}

impl SelectionFilter {
    pub fn can_select_voice(&self, voice: usize) -> bool {
        self.voices.is_empty() || self.voices.contains(&voice)
    }

    pub fn can_select(&self, element: &Element) -> bool {
        !self.excluded_types.contains(&element.ty()) && self.can_select_voice(element.voice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementData, Fraction};

    #[test]
    fn test_yaml_defaults() {
        let options = WriteOptions::from_yaml("test_mode: true").unwrap();
        assert!(options.test_mode);
        assert!(!options.write_track);
        assert!(options.filter.voices.is_empty());
    }

    #[test]
    fn test_filter_rejects_excluded_type_and_voice() {
        let filter = SelectionFilter {
            voices: vec![0],
            excluded_types: vec![ElementType::Fingering],
        };
        let fingering = Element::new(ElementData::Fingering { text: "1".into() }).at(0, Fraction::zero());
        let breath_v2 = Element::new(ElementData::Breath).at(1, Fraction::zero());
        let breath_v1 = Element::new(ElementData::Breath).at(0, Fraction::zero());
        assert!(!filter.can_select(&fingering));
        assert!(!filter.can_select(&breath_v2));
        assert!(filter.can_select(&breath_v1));
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(WriteOptions::from_yaml("test_mode: [").is_err());
    }
}
