//! Schema export and version-check settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_dir() -> PathBuf {
    PathBuf::from("schemas")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaConfig {
    /// Directory holding the exported `<name>_schema.json` files.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Treat a schema with no previous export as a failure in
    /// `labs schema check`.
    #[serde(default)]
    pub strict_versions: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            strict_versions: false,
        }
    }
}
