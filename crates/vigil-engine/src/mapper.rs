//! Raw rows to typed target references.
//!
//! A check either names the columns that carry each role (`ResultMapping`)
//! or the mapping is inferred from column names. Inference prefers the most
//! specific shape: relationship, then column, then table.

use serde_json::Value;

use vigil_core::entities::{RelationshipTarget, ResultMapping, TargetRef};

use crate::error::CheckError;
use crate::pg_array::parse_array_literal;
use crate::target::Row;

const RELATIONSHIP_COLUMNS: [&str; 6] = [
    "child_schema",
    "child_table",
    "child_cols",
    "parent_schema",
    "parent_table",
    "parent_cols",
];

/// Infer a mapping from result column names, matched case-insensitively.
///
/// The returned mapping uses the names exactly as the result spells them.
#[must_use]
pub fn suggest_mapping(columns: &[&str]) -> Option<ResultMapping> {
    let find = |want: &str| {
        columns
            .iter()
            .find(|name| name.eq_ignore_ascii_case(want))
            .map(|name| (*name).to_string())
    };

    if let [Some(cs), Some(ct), Some(cc), Some(ps), Some(pt), Some(pc)] =
        RELATIONSHIP_COLUMNS.map(find)
    {
        return Some(ResultMapping::Relationship {
            child_schema_col: cs,
            child_table_col: ct,
            child_cols_col: cc,
            parent_schema_col: ps,
            parent_table_col: pt,
            parent_cols_col: pc,
            fk_name_col: find("fk_name"),
        });
    }

    match (find("schema"), find("table"), find("column")) {
        (Some(schema_col), Some(table_col), Some(column_col)) => Some(ResultMapping::Column {
            schema_col,
            table_col,
            column_col,
        }),
        (Some(schema_col), Some(table_col), None) => Some(ResultMapping::Table {
            schema_col,
            table_col,
        }),
        _ => None,
    }
}

/// Map every row to a target. No row is skipped: one bad row fails the lot.
///
/// Without an explicit mapping, `columns` drives inference; no match means
/// no targets.
pub fn map_rows(
    rows: &[Row],
    mapping: Option<&ResultMapping>,
    columns: &[&str],
) -> Result<Vec<TargetRef>, CheckError> {
    let inferred;
    let mapping = match mapping {
        Some(mapping) => mapping,
        None => match suggest_mapping(columns) {
            Some(found) => {
                inferred = found;
                &inferred
            }
            None => return Ok(Vec::new()),
        },
    };

    rows.iter().map(|row| map_row(row, mapping)).collect()
}

fn map_row(row: &Row, mapping: &ResultMapping) -> Result<TargetRef, CheckError> {
    match mapping {
        ResultMapping::Table {
            schema_col,
            table_col,
        } => Ok(TargetRef::table(
            text(row, schema_col)?,
            text(row, table_col)?,
        )),
        ResultMapping::Column {
            schema_col,
            table_col,
            column_col,
        } => Ok(TargetRef::column(
            text(row, schema_col)?,
            text(row, table_col)?,
            text(row, column_col)?,
        )),
        ResultMapping::Relationship {
            child_schema_col,
            child_table_col,
            child_cols_col,
            parent_schema_col,
            parent_table_col,
            parent_cols_col,
            fk_name_col,
        } => {
            let fk_name = match fk_name_col {
                Some(col) => match row.get(col) {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(text(row, col)?),
                },
                None => None,
            };
            let target = RelationshipTarget::new(
                (
                    text(row, child_schema_col)?,
                    text(row, child_table_col)?,
                    column_list(row, child_cols_col)?,
                ),
                (
                    text(row, parent_schema_col)?,
                    text(row, parent_table_col)?,
                    column_list(row, parent_cols_col)?,
                ),
                fk_name,
            )
            .map_err(|e| CheckError::InvalidTargetEncoding {
                column: child_cols_col.clone(),
                reason: e.to_string(),
            })?;
            Ok(TargetRef::Relationship(target))
        }
    }
}

fn invalid(column: &str, reason: impl Into<String>) -> CheckError {
    CheckError::InvalidTargetEncoding {
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn present<'r>(row: &'r Row, column: &str) -> Result<&'r Value, CheckError> {
    match row.get(column) {
        None => Err(invalid(column, "column not in result")),
        Some(Value::Null) => Err(invalid(column, "value is null")),
        Some(value) => Ok(value),
    }
}

fn text(row: &Row, column: &str) -> Result<String, CheckError> {
    match present(row, column)? {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => Err(invalid(column, "value is empty")),
        other => Err(invalid(column, format!("expected text, got {other}"))),
    }
}

fn column_list(row: &Row, column: &str) -> Result<Vec<String>, CheckError> {
    parse_column_list(present(row, column)?).map_err(|reason| invalid(column, reason))
}

/// Decode a column list from a JSON array, a JSON-array string, or a
/// Postgres array literal.
pub fn parse_column_list(value: &Value) -> Result<Vec<String>, String> {
    let from_items = |items: &[Value]| {
        items
            .iter()
            .map(|item| match item {
                Value::String(s) if !s.is_empty() => Ok(s.clone()),
                other => Err(format!("column list entry {other} is not a column name")),
            })
            .collect::<Result<Vec<_>, _>>()
    };

    match value {
        Value::Array(items) => from_items(items),
        Value::String(s) if s.trim_start().starts_with('[') => {
            let items: Vec<Value> =
                serde_json::from_str(s).map_err(|e| format!("malformed JSON array: {e}"))?;
            from_items(&items)
        }
        Value::String(s) if s.trim_start().starts_with('{') => parse_array_literal(s)
            .ok_or_else(|| format!("malformed array literal {s:?}"))?
            .into_iter()
            .map(|item| item.ok_or_else(|| "column list contains NULL".to_string()))
            .collect(),
        other => Err(format!("expected a column list, got {other}")),
    }
}
