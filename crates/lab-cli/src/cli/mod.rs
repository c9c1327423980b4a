use clap::Parser;
use lab_config::LabConfig;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{Commands, RecordKind};

/// Top-level CLI parser for the `labs` binary.
#[derive(Debug, Parser)]
#[command(name = "labs", version, about = "Validate, merge, and check lab metadata records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw (defaults to the `output.pretty` setting)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self, config: &LabConfig) -> GlobalFlags {
        let default_format = if config.output.pretty {
            OutputFormat::Json
        } else {
            OutputFormat::Raw
        };
        GlobalFlags {
            format: self.format.unwrap_or(default_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use lab_config::LabConfig;
    use pretty_assertions::assert_eq;

    use super::subcommands::{DeltaCommands, SchemaCommands, UpgradeCommands};
    use super::{Cli, Commands, OutputFormat, RecordKind};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["labs", "--format", "raw", "--verbose", "schema", "list"])
            .expect("cli should parse");

        assert_eq!(cli.format, Some(OutputFormat::Raw));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Schema {
                action: SchemaCommands::List
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["labs", "validate", "subject", "s.json", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        let Commands::Validate(args) = &cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.kind, RecordKind::Subject);
        assert!(!args.schema);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["labs", "--format", "table", "schema", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn format_defaults_follow_config() {
        let cli = Cli::try_parse_from(["labs", "schema", "list"]).expect("cli should parse");
        let mut config = LabConfig::default();
        assert_eq!(cli.global_flags(&config).format, OutputFormat::Json);
        config.output.pretty = false;
        assert_eq!(cli.global_flags(&config).format, OutputFormat::Raw);

        let cli = Cli::try_parse_from(["labs", "-f", "json", "schema", "list"])
            .expect("cli should parse");
        assert_eq!(cli.global_flags(&config).format, OutputFormat::Json);
    }

    #[test]
    fn record_kinds_use_kebab_case() {
        let cli = Cli::try_parse_from(["labs", "merge", "quality-control", "a.json", "b.json"])
            .expect("cli should parse");
        let Commands::Merge(args) = &cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.kind, RecordKind::QualityControl);
        assert_eq!(args.kind.schema_name(), "quality_control");
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn nested_subcommands_parse() {
        let cli = Cli::try_parse_from(["labs", "delta", "expand", "usage.json"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Delta {
                action: DeltaCommands::Expand { .. }
            }
        ));

        let cli = Cli::try_parse_from(["labs", "schema", "check", "--old-dir", "published"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Schema {
                action: SchemaCommands::Check { old_dir: Some(_) }
            }
        ));

        let cli = Cli::try_parse_from(["labs", "upgrade", "session", "old.json", "--output-dir", "out"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Upgrade {
                action: UpgradeCommands::Session { output_dir: Some(_), .. }
            }
        ));
    }

    #[test]
    fn missing_positional_is_rejected() {
        assert!(Cli::try_parse_from(["labs", "compat", "instrument.json"]).is_err());
    }
}
