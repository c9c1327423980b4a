use lab_config::LabConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: &Commands, config: &LabConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => commands::validate::handle(args, flags),
        Commands::Merge(args) => commands::merge::handle(args, config, flags),
        Commands::Compat(args) => commands::compat::handle(args, flags),
        Commands::Schema { action } => commands::schema::handle(action, config, flags),
        Commands::Delta { action } => commands::delta::handle(action, flags),
        Commands::Upgrade { action } => commands::upgrade::handle(action, config, flags),
    }
}
