//! Registry errors

use crate::types::DocumentKey;
use thiserror::Error;

/// Error types for schema registry operations
///
/// Sample-level outcomes (`UnknownMetric`, invalid values) are not errors;
/// they are [`crate::gateway::Decision`] variants. Nothing here is fatal to
/// the process: the worst outcome is that one reload or one request fails.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema version not found: {0}")]
    UnknownVersion(DocumentKey),

    #[error("Malformed schema document: {0}")]
    Malformed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for schema registry operations
pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Serialization(e.to_string())
    }
}
