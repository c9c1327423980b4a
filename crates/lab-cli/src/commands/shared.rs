use std::fs;
use std::path::Path;

use anyhow::Context;
use lab_core::record::Record;
use serde_json::Value;

/// Load and validate a record, naming the file on failure.
pub fn load_record<T: Record>(path: &Path) -> anyhow::Result<T> {
    T::from_path(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Read a JSON file without interpreting it as a record.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("{} is not valid JSON", path.display()))
}
