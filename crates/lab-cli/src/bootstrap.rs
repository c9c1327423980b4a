use anyhow::Context;
use lab_config::LabConfig;

/// Load `.env` when present, then the layered configuration.
pub fn load_config() -> anyhow::Result<LabConfig> {
    LabConfig::load_with_dotenv().context("failed to load labschema configuration")
}
