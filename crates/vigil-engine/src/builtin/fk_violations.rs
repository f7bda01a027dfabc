use serde_json::{Value, json};

use vigil_core::entities::TargetRef;

use super::fk_json;
use crate::error::CheckError;
use crate::evaluate::CheckFindings;
use crate::executor::{QueryLimits, execute_with_limits};
use crate::interpolate::quote_ident;
use crate::target::TargetDatabase;
use crate::target::catalog::{CatalogSnapshot, ForeignKeyInfo};

/// `FROM child LEFT JOIN parent ... WHERE <orphaned>` shared by both queries.
fn orphan_clause(fk: &ForeignKeyInfo) -> String {
    let child = format!(
        "{}.{}",
        quote_ident(&fk.child_schema),
        quote_ident(&fk.child_table)
    );
    let parent = format!(
        "{}.{}",
        quote_ident(&fk.parent_schema),
        quote_ident(&fk.parent_table)
    );
    let join = fk
        .child_cols
        .iter()
        .zip(&fk.parent_cols)
        .map(|(c, p)| format!("c.{} = p.{}", quote_ident(c), quote_ident(p)))
        .collect::<Vec<_>>()
        .join(" AND ");
    let not_null = fk
        .child_cols
        .iter()
        .map(|c| format!("c.{} IS NOT NULL", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" AND ");
    let first_parent = fk.parent_cols.first().map_or_else(String::new, |p| quote_ident(p));

    format!(
        "FROM {child} c\nLEFT JOIN {parent} p ON {join}\nWHERE ({not_null})\n  AND p.{first_parent} IS NULL"
    )
}

/// Count of child rows whose key has no parent.
#[must_use]
pub fn count_sql(fk: &ForeignKeyInfo) -> String {
    format!("SELECT COUNT(*)::bigint AS violations\n{}", orphan_clause(fk))
}

/// Up to `limit` orphaned child rows.
#[must_use]
pub fn sample_sql(fk: &ForeignKeyInfo, limit: usize) -> String {
    format!("SELECT c.*\n{}\nLIMIT {limit}", orphan_clause(fk))
}

fn parse_count(value: Option<&Value>) -> Result<u64, CheckError> {
    match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| CheckError::ExecutionError(format!("unexpected violation count {value:?}")))
}

/// Orphaned child rows for every foreign key in the snapshot.
///
/// A sample is fetched only for keys with a non-zero count.
pub async fn fk_has_violations<T: TargetDatabase>(
    target: &mut T,
    catalog: &CatalogSnapshot,
    limits: QueryLimits,
    sample_limit: usize,
    sample_rows: usize,
) -> Result<CheckFindings, CheckError> {
    let mut violated = Vec::new();

    for fk in &catalog.foreign_keys {
        let counted = execute_with_limits(target, &count_sql(fk), limits).await?;
        let count = parse_count(counted.rows.first().and_then(|row| row.get("violations")))?;
        if count == 0 {
            continue;
        }
        tracing::debug!(fk = %fk.name, count, "orphaned rows found");

        let sample = execute_with_limits(
            target,
            &sample_sql(fk, sample_limit),
            limits.with_row_cap(sample_limit),
        )
        .await?;
        violated.push((fk, count, sample.rows));
    }

    let targets = violated
        .iter()
        .map(|(fk, _, _)| fk.to_target().map(TargetRef::Relationship))
        .collect::<Result<Vec<_>, _>>()?;
    let total: u64 = violated.iter().map(|(_, count, _)| count).sum();
    let relationships = violated.len();

    Ok(CheckFindings {
        summary: format!(
            "{relationships} foreign keys have violating rows ({total} rows total)"
        ),
        targets,
        rows: violated
            .into_iter()
            .take(sample_rows)
            .map(|(fk, count, sample)| {
                json!({ "fk": fk_json(fk), "violating_count": count, "sample": sample })
            })
            .collect(),
        violations: relationships as u64,
        truncated: relationships > sample_rows,
        total_violating_rows: Some(total),
    })
}
