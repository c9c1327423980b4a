use anyhow::{Context, anyhow};
use lab_merge::delta::{compress, expand};
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DeltaCommands;
use crate::commands::shared::read_json;
use crate::output::output;

/// Handle `labs delta`.
pub fn handle(action: &DeltaCommands, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = run(action)?;
    output(&result, flags.format)
}

pub fn run(action: &DeltaCommands) -> anyhow::Result<Value> {
    match action {
        DeltaCommands::Compress { file } => {
            let document = read_json(file)?;
            let records = document
                .as_array()
                .ok_or_else(|| anyhow!("{} must hold a JSON array", file.display()))?;
            compress(records).with_context(|| format!("failed to compress {}", file.display()))
        }
        DeltaCommands::Expand { file } => {
            let document = read_json(file)?;
            let records = expand(&document)
                .with_context(|| format!("failed to expand {}", file.display()))?;
            Ok(Value::Array(records))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn compress_then_expand_files() {
        let dir = tempfile::tempdir().unwrap();
        let records = json!([{"a": 1, "b": 2}, {"a": 1, "b": 3}]);
        let plain = dir.path().join("records.json");
        fs::write(&plain, records.to_string()).unwrap();

        let compressed = run(&DeltaCommands::Compress { file: plain }).unwrap();
        assert_eq!(compressed, json!({"__delta__": [{"a": 1, "b": 2}, {"b": 3}]}));

        let packed = dir.path().join("packed.json");
        fs::write(&packed, compressed.to_string()).unwrap();
        assert_eq!(run(&DeltaCommands::Expand { file: packed }).unwrap(), records);
    }

    #[test]
    fn compress_requires_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object.json");
        fs::write(&path, "{}").unwrap();
        let err = run(&DeltaCommands::Compress { file: path }).unwrap_err();
        assert!(err.to_string().contains("must hold a JSON array"));
    }
}
