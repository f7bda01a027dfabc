use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::{BuiltinCheck, NodeKind, Severity};

/// One node in a check template tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CheckNode {
    pub id: String,
    pub version_id: String,
    pub parent_id: Option<String>,
    /// Ordering key among siblings.
    pub position: i64,
    pub kind: NodeKind,
    pub title: String,
    pub severity: Severity,
    /// `None` for groups and for manual items.
    pub check: Option<CheckDescriptor>,
}

impl CheckNode {
    /// Item nodes that the engine executes.
    #[must_use]
    pub const fn is_automatic(&self) -> bool {
        matches!(self.kind, NodeKind::Item) && self.check.is_some()
    }
}

/// What an item node checks, resolved once when the node is read.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckDescriptor {
    /// A structural analysis shipped with the engine.
    Builtin { code: BuiltinCheck },
    /// An operator-authored parameterized query.
    SqlTemplate(SqlTemplateCheck),
    /// A built-in reference code this engine does not know.
    Unsupported { code: String },
}

impl CheckDescriptor {
    /// Resolve a stored built-in reference code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        BuiltinCheck::from_code(code).map_or_else(
            || Self::Unsupported {
                code: code.to_string(),
            },
            |code| Self::Builtin { code },
        )
    }
}

/// SQL template check: the query, how to read its rows, and when it fails.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SqlTemplateCheck {
    /// Query text with `{{placeholder}}` variables.
    pub template: String,
    /// Explicit row-to-target mapping; inferred from column names when absent.
    #[serde(default)]
    pub mapping: Option<ResultMapping>,
    #[serde(default)]
    pub rule: PassFailRule,
    /// Node-level template variables (`table`, `column`, `threshold`, ...).
    #[serde(default)]
    pub params: Map<String, Value>,
}

const fn default_expect_zero() -> bool {
    true
}

/// Pass/fail rule for a row count.
///
/// With the default rule any returned row is an issue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PassFailRule {
    #[serde(default = "default_expect_zero")]
    pub expect_zero: bool,
    /// Issue only when the row count exceeds this value. Overrides `expect_zero`.
    ///
    /// The row count is capped by the engine's `row_cap`, so a value at or
    /// above the cap could never trigger; such a check is blocked instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_if_gt: Option<u64>,
}

impl Default for PassFailRule {
    fn default() -> Self {
        Self {
            expect_zero: default_expect_zero(),
            fail_if_gt: None,
        }
    }
}

/// Column names to read each semantic role from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "target_kind", rename_all = "snake_case")]
pub enum ResultMapping {
    Table {
        schema_col: String,
        table_col: String,
    },
    Column {
        schema_col: String,
        table_col: String,
        column_col: String,
    },
    Relationship {
        child_schema_col: String,
        child_table_col: String,
        child_cols_col: String,
        parent_schema_col: String,
        parent_table_col: String,
        parent_cols_col: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fk_name_col: Option<String>,
    },
}
