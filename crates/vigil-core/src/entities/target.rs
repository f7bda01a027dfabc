use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// What a check result is about.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    Table {
        schema: String,
        table: String,
    },
    Column {
        schema: String,
        table: String,
        column: String,
    },
    Relationship(RelationshipTarget),
}

impl TargetRef {
    #[must_use]
    pub fn table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Table {
            schema: schema.into(),
            table: table.into(),
        }
    }

    #[must_use]
    pub fn column(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::Column {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A foreign-key style relationship between a child and a parent table.
///
/// Column lists correspond positionally: `child_cols[i]` references
/// `parent_cols[i]`. Build through [`RelationshipTarget::new`] to enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct RelationshipTarget {
    pub child_schema: String,
    pub child_table: String,
    pub child_cols: Vec<String>,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_cols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_name: Option<String>,
}

impl RelationshipTarget {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if either column list is empty or the
    /// lists differ in length.
    pub fn new(
        child: (String, String, Vec<String>),
        parent: (String, String, Vec<String>),
        fk_name: Option<String>,
    ) -> Result<Self, CoreError> {
        let (child_schema, child_table, child_cols) = child;
        let (parent_schema, parent_table, parent_cols) = parent;
        let target = Self {
            child_schema,
            child_table,
            child_cols,
            parent_schema,
            parent_table,
            parent_cols,
            fk_name,
        };
        target.validate()?;
        Ok(target)
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` when the column lists break positional
    /// correspondence.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.child_cols.is_empty() || self.parent_cols.is_empty() {
            return Err(CoreError::Validation(format!(
                "relationship {}.{} -> {}.{} has an empty column list",
                self.child_schema, self.child_table, self.parent_schema, self.parent_table
            )));
        }
        if self.child_cols.len() != self.parent_cols.len() {
            return Err(CoreError::Validation(format!(
                "relationship {}.{} -> {}.{} maps {} child columns to {} parent columns",
                self.child_schema,
                self.child_table,
                self.parent_schema,
                self.parent_table,
                self.child_cols.len(),
                self.parent_cols.len()
            )));
        }
        Ok(())
    }
}
