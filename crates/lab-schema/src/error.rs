//! Schema registry and version error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// Schema compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),

    /// A schema changed shape without an acceptable version bump.
    #[error("Schema {name} changed: {source}")]
    Version {
        name: String,
        #[source]
        source: VersionError,
    },

    #[error("Cannot read or write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Outcome of comparing two semantic versions.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The version string does not parse as semver.
    #[error("'{version}' is not a valid semantic version: {source}")]
    Format {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// The new version parses but is not one major, minor, or patch step
    /// ahead of the old one.
    #[error("version {new} is not a single increment of {old}")]
    Increment { old: String, new: String },
}
