//! Error types for the score writer
//!
//! Only caller-facing failures surface here. Problems found inside a write
//! pass (invalid properties, unresolved staves) are logged and skipped.

use thiserror::Error;

use crate::models::FractionOverflow;

/// Result alias used by the public entry points
pub type WriteResult<T> = Result<T, WriteError>;

#[derive(Debug, Error)]
pub enum WriteError {
    /// Options document is not valid YAML or does not match the schema
    #[error("Invalid YAML options: {0}")]
    YamlConfig(#[from] serde_yaml::Error),

    /// Options or document JSON failed to parse
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No score at index {0}")]
    UnknownScore(usize),

    /// Staff or tick range does not describe a selection in the score
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Tick arithmetic on the document left the 32-bit fraction range
    #[error("Tick arithmetic overflow: {0}")]
    TickOverflow(#[from] FractionOverflow),

    #[error("No document loaded")]
    NoDocument,
}
