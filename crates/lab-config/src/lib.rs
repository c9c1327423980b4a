//! # lab-config
//!
//! Layered configuration loading for the lab metadata tools using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LABSCHEMA_*` prefix, `__` as separator)
//! 2. Project-level `.labschema/config.toml`
//! 3. User-level `~/.config/labschema/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LABSCHEMA_OUTPUT__DIR` -> `output.dir`,
//! `LABSCHEMA_SCHEMA__STRICT_VERSIONS` -> `schema.strict_versions`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use lab_config::LabConfig;
//!
//! let config = LabConfig::load_with_dotenv().expect("config");
//! println!("writing records to {}", config.output.dir.display());
//! ```

mod error;
mod output;
mod schema;

pub use error::ConfigError;
pub use output::OutputConfig;
pub use schema::SchemaConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

impl LabConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`LabConfig::load_with_dotenv`] if you
    /// need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed and
    /// `ConfigError::InvalidValue` if the merged values fail
    /// [`LabConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`LabConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".labschema/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("LABSCHEMA_").split("__"))
    }

    /// Reject values that would make every command fail later.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("output.dir", "must not be empty"));
        }
        if self.schema.dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("schema.dir", "must not be empty"));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("labschema").join("config.toml"))
    }

    /// Load `.env` from the current directory. Silently does nothing if no
    /// `.env` is found.
    fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.output.pretty);
        assert!(!config.schema.strict_versions);
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let mut config = LabConfig::default();
        config.output.dir = PathBuf::new();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'output.dir': must not be empty"
        );
    }

    #[test]
    fn figment_builds_without_files() {
        let config: LabConfig = LabConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.schema.dir, PathBuf::from("schemas"));
    }
}
