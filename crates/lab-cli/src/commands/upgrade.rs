use std::path::{Path, PathBuf};

use anyhow::Context;
use lab_config::LabConfig;
use lab_core::entities::{Acquisition, Instrument};
use lab_core::record::Record;
use lab_core::upgrade::{Rig, Session, check_rig_session};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::UpgradeCommands;
use crate::commands::shared::read_json;
use crate::output::output;

/// Handle `labs upgrade`.
pub fn handle(
    action: &UpgradeCommands,
    config: &LabConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let result = run(action, config)?;
    output(&result, flags.format)
}

pub fn run(action: &UpgradeCommands, config: &LabConfig) -> anyhow::Result<Value> {
    match action {
        UpgradeCommands::Rig { file, output_dir } => {
            let dir = output_dir.as_deref().unwrap_or(&config.output.dir);
            let path = upgrade_file::<Rig, Instrument>(file, dir)?;
            Ok(json!({ "written": path }))
        }
        UpgradeCommands::Session { file, output_dir } => {
            let dir = output_dir.as_deref().unwrap_or(&config.output.dir);
            let path = upgrade_file::<Session, Acquisition>(file, dir)?;
            Ok(json!({ "written": path }))
        }
        UpgradeCommands::Check { rig, session } => {
            let legacy_rig: Rig = read_legacy(rig)?;
            let legacy_session: Session = read_legacy(session)?;
            check_rig_session(&legacy_rig, &legacy_session).with_context(|| {
                format!("{} does not match {}", session.display(), rig.display())
            })?;
            Ok(json!({ "compatible": true, "rig_id": legacy_rig.rig_id }))
        }
    }
}

fn read_legacy<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("{} is not a 1.x document", path.display()))
}

fn upgrade_file<L, T>(file: &Path, dir: &Path) -> anyhow::Result<PathBuf>
where
    L: DeserializeOwned,
    T: Record + TryFrom<L>,
    <T as TryFrom<L>>::Error: std::error::Error + Send + Sync + 'static,
{
    let legacy: L = read_legacy(file)?;
    let record =
        T::try_from(legacy).with_context(|| format!("failed to upgrade {}", file.display()))?;
    record
        .write_standard_file(dir, None, None)
        .with_context(|| format!("failed to write upgraded record to {}", dir.display()))
}
