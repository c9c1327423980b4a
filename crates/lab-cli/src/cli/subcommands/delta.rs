use std::path::PathBuf;

use clap::Subcommand;

/// Delta codec commands. Both read a JSON file and print the result.
#[derive(Clone, Debug, Subcommand)]
pub enum DeltaCommands {
    /// Compress a JSON array of flat objects.
    Compress { file: PathBuf },
    /// Expand a compressed list back into full records.
    Expand { file: PathBuf },
}
