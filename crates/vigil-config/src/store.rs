//! Result store configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".vigil/vigil.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file holding templates, runs, and results.
    /// `":memory:"` keeps everything in memory.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_project_local_file() {
        let config = StoreConfig::default();
        assert_eq!(config.path, ".vigil/vigil.db");
    }
}
