use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RunPhase;
use crate::rollup::RunRollup;

/// One audit run of a template version against a target database.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditRun {
    pub id: String,
    pub version_id: String,
    pub phase: RunPhase,
    /// `None` until the first rollup has been persisted.
    pub rollup: Option<RunRollup>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
