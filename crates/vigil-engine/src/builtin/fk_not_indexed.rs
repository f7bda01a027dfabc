use vigil_core::entities::TargetRef;

use super::fk_json;
use crate::error::CheckError;
use crate::evaluate::CheckFindings;
use crate::target::catalog::CatalogSnapshot;

/// Foreign keys whose child columns do not lead any valid index.
pub fn fk_not_indexed(
    catalog: &CatalogSnapshot,
    sample_rows: usize,
) -> Result<CheckFindings, CheckError> {
    let unindexed: Vec<_> = catalog
        .foreign_keys
        .iter()
        .filter(|fk| {
            !catalog
                .indexes_on(&fk.child_schema, &fk.child_table)
                .any(|idx| idx.covers_prefix(&fk.child_cols))
        })
        .collect();

    let targets = unindexed
        .iter()
        .map(|fk| fk.to_target().map(TargetRef::Relationship))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CheckFindings {
        summary: format!(
            "{} foreign keys missing a supporting index",
            unindexed.len()
        ),
        targets,
        rows: unindexed
            .iter()
            .take(sample_rows)
            .map(|fk| fk_json(fk))
            .collect(),
        violations: unindexed.len() as u64,
        truncated: unindexed.len() > sample_rows,
        total_violating_rows: None,
    })
}
