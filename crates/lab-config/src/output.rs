//! Where and how records are written.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory merged and validated records are written to.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Indent written JSON.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            pretty: default_pretty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = OutputConfig::default();
        assert_eq!(config.dir, PathBuf::from("."));
        assert!(config.pretty);
    }
}
