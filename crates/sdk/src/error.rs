//! Error types for the Capsule SDK.
//!
//! Every failure surfaces as one of these variants; nothing is retried
//! locally. Each operation is a single atomic remote call, so there are no
//! partial-failure semantics.

use capsule_core::CoreError;
use serde::Deserialize;

/// Result type for SDK operations.
pub type CapsuleResult<T> = Result<T, CapsuleError>;

/// Error types that can occur when talking to the Capsule API.
#[derive(Debug, thiserror::Error)]
pub enum CapsuleError {
    /// The remote API returned a non-2xx response.
    #[error("Capsule API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The call exceeded the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// The remote API could not be reached.
    #[error("connection error: {0}")]
    Connect(String),

    /// Any other HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A party payload carried an unrecognized `type` discriminant.
    #[error("unknown party type: {0}")]
    UnknownPartyType(String),

    /// A payload violated a schema invariant.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CapsuleError {
    /// Build an API error from a non-2xx response. The message is extracted
    /// from a JSON body's `message` field when parseable, else the raw text.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ApiErrorBody {
            message: String,
        }

        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => Self::Api {
                status,
                message: parsed.message,
            },
            Err(_) => Self::Api {
                status,
                message: body.to_string(),
            },
        }
    }
}

impl From<CoreError> for CapsuleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownPartyType(kind) => CapsuleError::UnknownPartyType(kind),
            CoreError::Validation(message) => CapsuleError::Validation(message),
            CoreError::Json(err) => CapsuleError::Json(err),
        }
    }
}
