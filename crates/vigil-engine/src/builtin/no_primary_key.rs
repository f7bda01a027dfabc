use serde_json::json;

use vigil_core::entities::TargetRef;

use crate::evaluate::CheckFindings;
use crate::target::catalog::CatalogSnapshot;

/// Tables without a primary-key constraint.
#[must_use]
pub fn no_primary_key(catalog: &CatalogSnapshot, sample_rows: usize) -> CheckFindings {
    let missing: Vec<_> = catalog
        .tables
        .iter()
        .filter(|t| !t.has_primary_key)
        .collect();

    CheckFindings {
        summary: format!("{} tables missing primary key", missing.len()),
        targets: missing
            .iter()
            .map(|t| TargetRef::table(&t.schema, &t.name))
            .collect(),
        rows: missing
            .iter()
            .take(sample_rows)
            .map(|t| json!({ "schema": t.schema, "table": t.name }))
            .collect(),
        violations: missing.len() as u64,
        truncated: missing.len() > sample_rows,
        total_violating_rows: None,
    }
}
