//! Central schema registry for the top-level lab records.
//!
//! The `SchemaRegistry` builds JSON Schemas from lab-core types at
//! construction time using [`schemars::schema_for!`], pins each schema's
//! `schema_version` property to the record's version constant, and provides
//! validation via `jsonschema`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use lab_core::entities::{
    Acquisition, Instrument, Metadata, Procedures, Processing, QualityControl, Subject,
};
use lab_core::record::Record;
use schemars::schema_for;
use serde_json::Value;

use crate::error::SchemaError;
use crate::versions::{compare_versions, schemas_equal};

struct RegisteredSchema {
    version: &'static str,
    schema: Value,
}

/// Central store of the JSON Schemas for every top-level record.
///
/// Built from lab-core types via [`schemars::schema_for!`]. Provides lookup
/// by name and validation of arbitrary JSON values against registered schemas.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, RegisteredSchema>,
}

/// Outcome of comparing one schema with a previously exported copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    Unchanged { name: &'static str },
    /// The shape changed and the version moved forward by one step.
    Bumped {
        name: &'static str,
        old: String,
        new: &'static str,
    },
    /// No previously exported schema exists.
    New { name: &'static str },
}

impl SchemaCheck {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unchanged { name } | Self::Bumped { name, .. } | Self::New { name } => name,
        }
    }
}

impl fmt::Display for SchemaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged { name } => write!(f, "{name}: unchanged"),
            Self::Bumped { name, old, new } => write!(f, "{name}: {old} -> {new}"),
            Self::New { name } => write!(f, "{name}: new"),
        }
    }
}

/// Replace the generated `schema_version` property with a constant so that
/// instances tagged with any other version are rejected.
fn pin_version(mut schema: Value, version: &str) -> Value {
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert(
            "schema_version".to_string(),
            serde_json::json!({ "type": "string", "const": version, "default": version }),
        );
    }
    schema
}

/// The version a schema was exported with, if it carries one.
#[must_use]
pub fn schema_version_of(schema: &Value) -> Option<&str> {
    schema
        .pointer("/properties/schema_version/const")
        .and_then(Value::as_str)
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            RegisteredSchema {
                version: <$ty as Record>::SCHEMA_VERSION,
                schema: pin_version(
                    schema_for!($ty).to_value(),
                    <$ty as Record>::SCHEMA_VERSION,
                ),
            },
        );
    };
}

impl SchemaRegistry {
    /// Build a new registry containing every top-level record schema.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        register!(schemas, "subject", Subject);
        register!(schemas, "procedures", Procedures);
        register!(schemas, "instrument", Instrument);
        register!(schemas, "acquisition", Acquisition);
        register!(schemas, "processing", Processing);
        register!(schemas, "quality_control", QualityControl);
        register!(schemas, "metadata", Metadata);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name).map(|entry| &entry.schema)
    }

    #[must_use]
    pub fn version(&self, name: &str) -> Option<&'static str> {
        self.schemas.get(name).map(|entry| entry.version)
    }

    /// Validate a JSON value against a named schema, collecting every
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn entries(&self) -> Vec<(&'static str, &RegisteredSchema)> {
        let mut entries: Vec<_> = self
            .schemas
            .iter()
            .map(|(name, entry)| (*name, entry))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Write every schema to `dir` as `<name>_schema.json`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Io` if the directory or a file cannot be written.
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
        fs::create_dir_all(dir).map_err(|source| SchemaError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut written = Vec::with_capacity(self.schemas.len());
        for (name, entry) in self.entries() {
            let path = dir.join(schema_filename(name));
            fs::write(&path, serde_json::to_string_pretty(&entry.schema)?).map_err(|source| {
                SchemaError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
            tracing::debug!(path = %path.display(), "exported schema");
            written.push(path);
        }
        Ok(written)
    }

    /// Compare every schema with its previously exported copy in `old_dir`.
    ///
    /// A changed schema must carry a version one step ahead of the exported
    /// one. A missing file is reported as [`SchemaCheck::New`].
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Io` or `SchemaError::Json` when an exported
    /// schema cannot be read, and `SchemaError::Version` for the first schema
    /// whose version was not bumped correctly.
    pub fn check_against(&self, old_dir: &Path) -> Result<Vec<SchemaCheck>, SchemaError> {
        let mut checks = Vec::with_capacity(self.schemas.len());
        for (name, entry) in self.entries() {
            let path = old_dir.join(schema_filename(name));
            if !path.exists() {
                tracing::info!(name, "no previously exported schema");
                checks.push(SchemaCheck::New { name });
                continue;
            }
            let contents = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                path: path.clone(),
                source,
            })?;
            let old: Value = serde_json::from_str(&contents)?;
            if schemas_equal(&entry.schema, &old) {
                checks.push(SchemaCheck::Unchanged { name });
                continue;
            }
            let old_version = schema_version_of(&old).unwrap_or_default();
            compare_versions(entry.version, old_version).map_err(|source| {
                SchemaError::Version {
                    name: name.to_string(),
                    source,
                }
            })?;
            checks.push(SchemaCheck::Bumped {
                name,
                old: old_version.to_string(),
                new: entry.version,
            });
        }
        Ok(checks)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_filename(name: &str) -> String {
    format!("{name}_schema.json")
}
