//! Operator-authored SQL checks.

use serde_json::{Map, Value};

use vigil_core::entities::{PassFailRule, SqlTemplateCheck};

use crate::error::CheckError;
use crate::evaluate::CheckFindings;
use crate::executor::{QueryLimits, execute_guarded};
use crate::interpolate::interpolate;
use crate::mapper::map_rows;
use crate::target::TargetDatabase;

/// Variables every template sees: `schemas` and `schema` (the first one).
#[must_use]
pub fn run_variables(schemas: &[String]) -> Map<String, Value> {
    let mut vars = Map::new();
    vars.insert(
        "schemas".into(),
        Value::Array(schemas.iter().cloned().map(Value::String).collect()),
    );
    if let Some(first) = schemas.first() {
        vars.insert("schema".into(), Value::String(first.clone()));
    }
    vars
}

/// Run variables overlaid with the node's own parameters.
#[must_use]
pub fn node_variables(base: &Map<String, Value>, params: &Map<String, Value>) -> Map<String, Value> {
    let mut vars = base.clone();
    vars.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
}

/// Reject a `fail_if_gt` the capped row count can never exceed.
///
/// # Errors
///
/// `UnreachableThreshold` when `fail_if_gt >= row_cap`.
pub fn ensure_reachable(rule: &PassFailRule, row_cap: usize) -> Result<(), CheckError> {
    match rule.fail_if_gt {
        Some(threshold) if u64::try_from(row_cap).is_ok_and(|cap| threshold >= cap) => {
            Err(CheckError::UnreachableThreshold { threshold, row_cap })
        }
        _ => Ok(()),
    }
}

/// Interpolate, guard, execute, and map one template check.
///
/// The rule is checked against the row cap before anything reaches the target.
pub async fn run_template_check<T: TargetDatabase>(
    target: &mut T,
    check: &SqlTemplateCheck,
    base_vars: &Map<String, Value>,
    limits: QueryLimits,
    sample_rows: usize,
) -> Result<CheckFindings, CheckError> {
    ensure_reachable(&check.rule, limits.row_cap)?;
    let vars = node_variables(base_vars, &check.params);
    let sql = interpolate(&check.template, &vars)?;
    let executed = execute_guarded(target, &sql, limits).await?;
    let targets = map_rows(&executed.rows, check.mapping.as_ref(), &executed.column_names())?;

    let row_count = executed.row_count();
    let summary = if executed.truncated {
        format!("{row_count} rows returned (row cap reached)")
    } else {
        format!("{row_count} rows returned")
    };

    Ok(CheckFindings {
        summary,
        targets,
        rows: executed
            .rows
            .into_iter()
            .take(sample_rows)
            .map(Value::Object)
            .collect(),
        violations: row_count,
        truncated: executed.truncated,
        total_violating_rows: None,
    })
}
