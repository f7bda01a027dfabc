//! Guardrails for check execution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_statement_timeout_ms() -> u64 {
    2_500
}

const fn default_row_cap() -> usize {
    100
}

const fn default_sample_rows() -> usize {
    25
}

const fn default_fk_sample_limit() -> usize {
    25
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Per-statement timeout enforced by the target database.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// Maximum rows returned by any template query.
    #[serde(default = "default_row_cap")]
    pub row_cap: usize,

    /// Rows kept in a result's output sample.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Orphaned rows sampled per violated foreign key.
    #[serde(default = "default_fk_sample_limit")]
    pub fk_sample_limit: usize,

    /// Time allowed to open the target connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            statement_timeout_ms: default_statement_timeout_ms(),
            row_cap: default_row_cap(),
            sample_rows: default_sample_rows(),
            fk_sample_limit: default_fk_sample_limit(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub const fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Reject guardrails that would disable themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field: &str| ConfigError::InvalidValue {
            field: format!("engine.{field}"),
            reason: "must be greater than zero".into(),
        };
        if self.statement_timeout_ms == 0 {
            return Err(zero("statement_timeout_ms"));
        }
        if self.row_cap == 0 {
            return Err(zero("row_cap"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(zero("connect_timeout_secs"));
        }
        Ok(())
    }
}
