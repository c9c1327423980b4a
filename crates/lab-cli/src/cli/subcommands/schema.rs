use std::path::PathBuf;

use clap::Subcommand;

/// Schema registry commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SchemaCommands {
    /// Print the JSON Schema of a record.
    Dump { name: String },
    /// List registered schemas with their versions.
    List,
    /// Write every schema to `<name>_schema.json`.
    Export {
        /// Target directory (defaults to `schema.dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Compare the current schemas with a previous export.
    Check {
        /// Directory of the previous export (defaults to `schema.dir`).
        #[arg(long)]
        old_dir: Option<PathBuf>,
    },
}
