use std::path::PathBuf;

use clap::Subcommand;

/// Upgrades from 1.x documents.
#[derive(Clone, Debug, Subcommand)]
pub enum UpgradeCommands {
    /// Convert a 1.x rig into an instrument and write it.
    Rig {
        file: PathBuf,
        /// Directory to write to (defaults to `output.dir`).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Convert a 1.x session into an acquisition and write it.
    Session {
        file: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Check a 1.x session against its rig without writing anything.
    Check { rig: PathBuf, session: PathBuf },
}
