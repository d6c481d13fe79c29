//! Error types for the squawk store and pipeline.

use thiserror::Error;

/// Main error type for squawker operations.
#[derive(Debug, Error)]
pub enum SquawkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A required field was missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write to the store failed. `target` is the URI that was written to.
    #[error("Failed to write to {target}: {reason}")]
    Persistence { target: String, reason: String },

    /// The request does not match any route, or the route does not support it.
    #[error("Unknown uri: {0}")]
    UnsupportedRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SquawkError {
    pub(crate) fn missing_field(field: &str) -> Self {
        SquawkError::Validation(format!("missing required field '{}'", field))
    }

    pub(crate) fn persistence(target: impl Into<String>, reason: impl ToString) -> Self {
        SquawkError::Persistence {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for SquawkError {
    fn from(e: serde_json::Error) -> Self {
        SquawkError::Serialization(e.to_string())
    }
}

/// Result type for squawker operations.
pub type Result<T> = std::result::Result<T, SquawkError>;
