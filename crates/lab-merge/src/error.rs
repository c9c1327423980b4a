//! Merge error types.

use lab_core::errors::ValidationError;
use thiserror::Error;

/// Errors from merging records or decoding delta-compressed data.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Two records disagree on a field that must be identical to merge.
    #[error("cannot merge {field}: '{left}' conflicts with '{right}'")]
    Conflict {
        field: String,
        left: String,
        right: String,
    },

    /// The combined record violates one of its own rules.
    #[error("combined record is invalid: {0}")]
    Validation(#[from] ValidationError),

    /// Input to the delta codec does not have the expected shape.
    #[error("malformed delta data: {0}")]
    MalformedDelta(String),

    /// Typed records could not be converted to or from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    pub fn conflict(
        field: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            field: field.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}
