//! # lab-schema
//!
//! JSON Schema registry and version bookkeeping for lab metadata records.
//!
//! This crate provides:
//! - `SchemaRegistry`: one generated JSON Schema per top-level record, tagged
//!   with the record's schema version
//! - Validation of arbitrary JSON values against a registered schema
//! - Export of every schema to `<name>_schema.json` and comparison against a
//!   previously exported set (`labs schema check`)
//!
//! ## Architecture
//!
//! Record types are defined in `lab-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry, validation, and
//! export layer. `versions` holds the semantic-version increment rules used
//! when a schema changes shape.

pub mod error;
pub mod registry;
pub mod versions;

pub use error::{SchemaError, VersionError};
pub use registry::{SchemaCheck, SchemaRegistry};
pub use versions::{compare_versions, schemas_equal};
