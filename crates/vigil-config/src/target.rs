//! Default audit target.

use serde::{Deserialize, Serialize};

fn default_schemas() -> Vec<String> {
    vec!["public".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Postgres connection string (e.g., `postgres://auditor@db:5432/app`).
    #[serde(default)]
    pub database_url: String,

    /// Schemas audited when a run does not name any.
    #[serde(default = "default_schemas")]
    pub schemas: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            schemas: default_schemas(),
        }
    }
}

impl TargetConfig {
    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
    }
}
