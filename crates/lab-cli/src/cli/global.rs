use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON.
    Json,
    /// Compact single-line JSON.
    Raw,
}

/// Global flags resolved against the loaded configuration. Logging flags
/// are consumed when tracing is installed.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
}
