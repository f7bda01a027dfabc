//! Severity, status, phase, and kind enums for Vigil.
//!
//! All enums use `snake_case` serialization (built-in check codes use
//! `SCREAMING_SNAKE_CASE` to match how they are authored in templates).
//! `as_str()` returns the exact string stored in the result store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Configured severity of a check node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Blocking,
}

impl Severity {
    /// Result status for a check of this severity that found issues.
    ///
    /// Shared by built-in and template checks.
    #[must_use]
    pub const fn issue_status(self) -> ResultStatus {
        match self {
            Self::Blocking => ResultStatus::Blocked,
            Self::Warning => ResultStatus::Warning,
            Self::Info | Self::Error => ResultStatus::Fail,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Blocking => "blocking",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResultStatus
// ---------------------------------------------------------------------------

/// Status of one node's result within one audit run.
///
/// ```text
/// unchecked → pass | warning | fail | blocked   (overwritten by every execution)
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    #[default]
    Unchecked,
    Pass,
    Warning,
    Fail,
    Blocked,
}

impl ResultStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Aggregate status of an audit run.
///
/// Precedence, highest first: `blocked > fail > warning > incomplete > pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pass,
    Incomplete,
    Warning,
    Fail,
    Blocked,
}

impl RunStatus {
    /// Rank used for precedence; higher wins.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Incomplete => 1,
            Self::Warning => 2,
            Self::Fail => 3,
            Self::Blocked => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Incomplete => "incomplete",
            Self::Warning => "warning",
            Self::Fail => "fail",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunPhase
// ---------------------------------------------------------------------------

/// Lifecycle phase of an audit run execution.
///
/// ```text
/// initializing → running → completed
///      ↑                      │
///      └──────────────────────┘  (re-run)
/// ```
///
/// `initializing` can be entered from any phase so that a run interrupted
/// mid-way can be executed again.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Initializing,
    Running,
    Completed,
}

impl RunPhase {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Initializing => &[Self::Initializing, Self::Running],
            Self::Running => &[Self::Initializing, Self::Completed],
            Self::Completed => &[Self::Initializing],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Kind of a node in a check template tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Item,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunType
// ---------------------------------------------------------------------------

/// Whether a result is produced by the engine or recorded by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    Automatic,
    Manual,
}

impl RunType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BuiltinCheck
// ---------------------------------------------------------------------------

/// Structural analyses shipped with the engine, referenced by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuiltinCheck {
    NoPrimaryKey,
    FkNotIndexed,
    FkHasViolations,
}

impl BuiltinCheck {
    pub const ALL: [Self; 3] = [Self::NoPrimaryKey, Self::FkNotIndexed, Self::FkHasViolations];

    /// Resolve a reference code as authored in a template.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.as_str() == code)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPrimaryKey => "NO_PRIMARY_KEY",
            Self::FkNotIndexed => "FK_NOT_INDEXED",
            Self::FkHasViolations => "FK_HAS_VIOLATIONS",
        }
    }
}

impl fmt::Display for BuiltinCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
