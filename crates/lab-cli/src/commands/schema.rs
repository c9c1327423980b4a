use anyhow::{Context, anyhow, bail};
use lab_config::LabConfig;
use lab_schema::{SchemaCheck, SchemaRegistry};
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SchemaCommands;
use crate::output::output;

/// Handle `labs schema`.
pub fn handle(action: &SchemaCommands, config: &LabConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = run(action, config, &SchemaRegistry::new())?;
    output(&result, flags.format)
}

pub fn run(
    action: &SchemaCommands,
    config: &LabConfig,
    registry: &SchemaRegistry,
) -> anyhow::Result<Value> {
    match action {
        SchemaCommands::Dump { name } => registry
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("unknown schema '{name}'; see `labs schema list`")),
        SchemaCommands::List => Ok(registry
            .list()
            .into_iter()
            .map(|name| json!({ "name": name, "version": registry.version(name) }))
            .collect()),
        SchemaCommands::Export { dir } => {
            let dir = dir.as_deref().unwrap_or(&config.schema.dir);
            let written = registry
                .export(dir)
                .with_context(|| format!("failed to export schemas to {}", dir.display()))?;
            Ok(json!({ "written": written }))
        }
        SchemaCommands::Check { old_dir } => {
            let old_dir = old_dir.as_deref().unwrap_or(&config.schema.dir);
            let checks = registry.check_against(old_dir)?;
            if config.schema.strict_versions {
                let missing: Vec<&str> = checks
                    .iter()
                    .filter(|check| matches!(check, SchemaCheck::New { .. }))
                    .map(SchemaCheck::name)
                    .collect();
                if !missing.is_empty() {
                    bail!(
                        "no previous export in {} for: {}",
                        old_dir.display(),
                        missing.join(", ")
                    );
                }
            }
            Ok(checks.iter().map(ToString::to_string).collect())
        }
    }
}
