use std::path::Path;

use anyhow::Context;
use lab_core::entities::{
    Acquisition, Instrument, Metadata, Procedures, Processing, QualityControl, Subject,
};
use lab_core::record::Record;
use lab_schema::SchemaRegistry;
use serde_json::Value;

use crate::cli::root_commands::ValidateArgs;
use crate::cli::{GlobalFlags, RecordKind};
use crate::commands::shared::{load_record, read_json};
use crate::output::output;

/// Handle `labs validate`.
pub fn handle(args: &ValidateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let record = run(args)?;
    output(&record, flags.format)
}

/// Validate the file and return the record as loaded.
pub fn run(args: &ValidateArgs) -> anyhow::Result<Value> {
    if args.schema {
        let document = read_json(&args.file)?;
        SchemaRegistry::new()
            .validate(args.kind.schema_name(), &document)
            .with_context(|| format!("{} does not match its schema", args.file.display()))?;
    }
    match args.kind {
        RecordKind::Subject => load_as::<Subject>(&args.file),
        RecordKind::Procedures => load_as::<Procedures>(&args.file),
        RecordKind::Instrument => load_as::<Instrument>(&args.file),
        RecordKind::Acquisition => load_as::<Acquisition>(&args.file),
        RecordKind::Processing => load_as::<Processing>(&args.file),
        RecordKind::QualityControl => load_as::<QualityControl>(&args.file),
        RecordKind::Metadata => load_as::<Metadata>(&args.file),
    }
}

fn load_as<T: Record>(path: &Path) -> anyhow::Result<Value> {
    let record: T = load_record(path)?;
    tracing::info!(path = %path.display(), stem = T::FILE_STEM, "record is valid");
    Ok(serde_json::to_value(&record)?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../lab-core/tests/fixtures")
            .join(name)
    }

    fn args(kind: RecordKind, file: PathBuf, schema: bool) -> ValidateArgs {
        ValidateArgs { kind, file, schema }
    }

    #[test]
    fn valid_fixture_is_echoed() {
        let record = run(&args(RecordKind::Subject, fixture("subject.json"), true)).unwrap();
        assert_eq!(record["subject_id"], "625100");
    }

    #[test]
    fn wrong_kind_fails_to_load() {
        let err = run(&args(RecordKind::Instrument, fixture("subject.json"), false)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load"));
    }

    #[test]
    fn schema_flag_reports_schema_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.json");
        let mut document = read_json(&fixture("subject.json")).unwrap();
        document["sex"] = serde_json::json!("Unknown");
        std::fs::write(&path, document.to_string()).unwrap();

        let err = run(&args(RecordKind::Subject, path, true)).unwrap_err();
        assert!(format!("{err:#}").contains("does not match its schema"));
    }
}
