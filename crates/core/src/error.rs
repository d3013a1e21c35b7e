//! Error types for the core domain logic.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while decoding or validating domain payloads.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A party payload carried a `type` discriminant we do not recognize.
    #[error("unknown party type: {0}")]
    UnknownPartyType(String),

    /// A payload violated a schema invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
