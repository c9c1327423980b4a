//! Persistence for top-level records.
//!
//! Every entity document is one JSON file. Loading re-runs the same
//! validators as construction, and writing refuses an invalid record.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::DocumentError;
use crate::validate::Validate;

/// A top-level entity document with a fixed schema-version tag.
pub trait Record: Serialize + DeserializeOwned + Validate {
    /// Version of the shape this build reads and writes.
    const SCHEMA_VERSION: &'static str;
    /// Stem of the standard file name, e.g. `subject` for `subject.json`.
    const FILE_STEM: &'static str;

    fn schema_version(&self) -> &str;

    #[must_use]
    fn default_filename() -> String {
        format!("{}.json", Self::FILE_STEM)
    }

    /// `{prefix}_{stem}.json`, with `suffix` replacing the `.json`
    /// extension when given.
    #[must_use]
    fn standard_filename(prefix: Option<&str>, suffix: Option<&str>) -> String {
        let stem = match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}_{}", Self::FILE_STEM),
            _ => Self::FILE_STEM.to_string(),
        };
        format!("{stem}{}", suffix.unwrap_or(".json"))
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Json` for malformed or mis-shaped JSON and
    /// `DocumentError::Validation` when the parsed record violates a rule.
    fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let record: Self = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Same as [`Record::from_json_str`].
    fn from_json_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let record: Self = serde_json::from_value(value)?;
        record.validate()?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the file cannot be read, otherwise the
    /// errors of [`Record::from_json_str`].
    fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let contents = fs::read_to_string(path)?;
        let record = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), stem = Self::FILE_STEM, "loaded record");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `DocumentError::Json` if serialization fails.
    fn to_json_string(&self, pretty: bool) -> Result<String, DocumentError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Validate, then write the record to `dir` under its standard name.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Validation` without touching the filesystem
    /// when the record is invalid, or `DocumentError::Io` on write failure.
    fn write_standard_file(
        &self,
        dir: &Path,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<PathBuf, DocumentError> {
        self.validate()?;
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::standard_filename(prefix, suffix));
        fs::write(&path, self.to_json_string(true)?)?;
        tracing::debug!(path = %path.display(), stem = Self::FILE_STEM, "wrote record");
        Ok(path)
    }
}
