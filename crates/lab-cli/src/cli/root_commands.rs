use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use super::subcommands::{DeltaCommands, SchemaCommands, UpgradeCommands};

/// Top-level record documents the CLI can load.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RecordKind {
    Subject,
    Procedures,
    Instrument,
    Acquisition,
    Processing,
    QualityControl,
    Metadata,
}

impl RecordKind {
    /// Name of the record's schema in the registry.
    #[must_use]
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Procedures => "procedures",
            Self::Instrument => "instrument",
            Self::Acquisition => "acquisition",
            Self::Processing => "processing",
            Self::QualityControl => "quality_control",
            Self::Metadata => "metadata",
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Load a record, run every validator, and print it.
    Validate(ValidateArgs),
    /// Combine two partial records and write the result.
    Merge(MergeArgs),
    /// Check an acquisition against the instrument it names.
    Compat(CompatArgs),
    /// JSON Schema registry and version checks.
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Delta-compress or expand a list of flat records.
    Delta {
        #[command(subcommand)]
        action: DeltaCommands,
    },
    /// Convert 1.x rig and session documents.
    Upgrade {
        #[command(subcommand)]
        action: UpgradeCommands,
    },
}

/// Arguments for `labs validate`.
#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    pub kind: RecordKind,
    pub file: PathBuf,
    /// Also validate the document against the generated JSON Schema.
    #[arg(long)]
    pub schema: bool,
}

/// Arguments for `labs merge`.
#[derive(Clone, Debug, Args)]
pub struct MergeArgs {
    pub kind: RecordKind,
    pub first: PathBuf,
    pub second: PathBuf,
    /// Directory to write the merged record to (defaults to `output.dir`).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Prefix for the written file name, e.g. a subject id.
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Arguments for `labs compat`.
#[derive(Clone, Debug, Args)]
pub struct CompatArgs {
    pub instrument: PathBuf,
    pub acquisition: PathBuf,
}
