use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::TargetRef;
use crate::enums::{ResultStatus, RunType, Severity};

/// One node's outcome within one audit run.
///
/// Created `unchecked` when the run is initialized and overwritten in place
/// by every execution of the node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CheckResult {
    pub run_id: String,
    pub node_id: String,
    pub status: ResultStatus,
    /// Copied from the node at execution time.
    pub severity: Severity,
    pub run_type: RunType,
    pub targets: Vec<TargetRef>,
    pub output: Option<CheckOutput>,
    pub issue_count: u64,
    pub pass_count: u64,
    pub duration_ms: Option<u64>,
    pub executed_at: Option<DateTime<Utc>>,
}

/// Human-readable and sampled output of one execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CheckOutput {
    pub summary: String,
    pub stats: OutputStats,
    /// Bounded sample of raw rows; never the full result set.
    #[serde(default)]
    pub rows: Vec<Value>,
    /// Set when the check could not be evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OutputStats {
    /// Rows (or violations) the pass/fail rule was evaluated on.
    pub row_count: u64,
    /// Whether the row cap cut the result set short.
    #[serde(default)]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_violating_rows: Option<u64>,
}

/// What the engine writes back for a node after executing it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CheckExecution {
    pub status: ResultStatus,
    pub severity: Severity,
    pub targets: Vec<TargetRef>,
    pub output: CheckOutput,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

impl CheckExecution {
    /// A terminal result for a node whose check raised an error.
    #[must_use]
    pub fn errored(severity: Severity, message: String, duration_ms: u64) -> Self {
        Self {
            status: ResultStatus::Blocked,
            severity,
            targets: Vec::new(),
            output: CheckOutput {
                summary: format!("check could not be evaluated: {message}"),
                stats: OutputStats::default(),
                rows: Vec::new(),
                error: Some(message),
            },
            duration_ms,
            executed_at: Utc::now(),
        }
    }

    /// Number of issues reported (zero for a pass).
    #[must_use]
    pub const fn issue_count(&self) -> u64 {
        match self.status {
            ResultStatus::Pass | ResultStatus::Unchecked => 0,
            _ => self.output.stats.row_count,
        }
    }

    #[must_use]
    pub const fn pass_count(&self) -> u64 {
        match self.status {
            ResultStatus::Pass => 1,
            _ => 0,
        }
    }
}
