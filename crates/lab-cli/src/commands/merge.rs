use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use lab_config::LabConfig;
use lab_core::entities::{Acquisition, Procedures, Processing, QualityControl};
use lab_core::record::Record;
use lab_merge::Combine;

use crate::cli::root_commands::MergeArgs;
use crate::cli::{GlobalFlags, RecordKind};
use crate::commands::shared::load_record;
use crate::output::output;

/// Handle `labs merge`.
pub fn handle(args: &MergeArgs, config: &LabConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = run(args, config)?;
    output(&serde_json::json!({ "written": path }), flags.format)
}

/// Combine both files and return the path of the written record.
pub fn run(args: &MergeArgs, config: &LabConfig) -> anyhow::Result<PathBuf> {
    let dir = args.output_dir.as_deref().unwrap_or(&config.output.dir);
    match args.kind {
        RecordKind::Procedures => merge_files::<Procedures>(args, dir),
        RecordKind::Processing => merge_files::<Processing>(args, dir),
        RecordKind::QualityControl => merge_files::<QualityControl>(args, dir),
        RecordKind::Acquisition => merge_files::<Acquisition>(args, dir),
        kind @ (RecordKind::Subject | RecordKind::Instrument | RecordKind::Metadata) => {
            bail!("{} records cannot be merged", kind.schema_name())
        }
    }
}

fn merge_files<T: Record + Combine>(args: &MergeArgs, dir: &Path) -> anyhow::Result<PathBuf> {
    let first: T = load_record(&args.first)?;
    let second: T = load_record(&args.second)?;
    let merged = first.combine(&second).with_context(|| {
        format!(
            "failed to merge {} with {}",
            args.first.display(),
            args.second.display()
        )
    })?;
    merged
        .write_standard_file(dir, args.prefix.as_deref(), None)
        .with_context(|| format!("failed to write merged record to {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../lab-core/tests/fixtures")
            .join(name)
    }

    fn args(kind: RecordKind, first: &str, second: &str, output_dir: &Path) -> MergeArgs {
        MergeArgs {
            kind,
            first: fixture(first),
            second: fixture(second),
            output_dir: Some(output_dir.to_path_buf()),
            prefix: Some("625100".into()),
        }
    }

    #[test]
    fn quality_control_merge_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(
            RecordKind::QualityControl,
            "quality_control.json",
            "quality_control.json",
            dir.path(),
        );

        let path = run(&args, &LabConfig::default()).unwrap();
        assert_eq!(path, dir.path().join("625100_quality_control.json"));
        let merged = QualityControl::from_path(&path).unwrap();
        assert_eq!(merged.metrics.len(), 4);
    }

    #[test]
    fn duplicate_processes_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(
            RecordKind::Processing,
            "processing.json",
            "processing.json",
            dir.path(),
        );

        let err = run(&args, &LabConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to merge"));
        assert!(!dir.path().join("625100_processing.json").exists());
    }

    #[test]
    fn subjects_cannot_be_merged() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(RecordKind::Subject, "subject.json", "subject.json", dir.path());
        let err = run(&args, &LabConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "subject records cannot be merged");
    }
}
