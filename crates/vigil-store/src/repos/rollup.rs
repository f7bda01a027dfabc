//! Run rollup persistence.

use chrono::Utc;

use vigil_core::enums::ResultStatus;
use vigil_core::rollup::RunRollup;

use crate::error::StoreError;
use crate::helpers::{parse_enum, to_i64};
use crate::service::AuditStore;

impl AuditStore {
    /// Recompute the rollup from every result of the run and store it.
    ///
    /// Read and write happen in one transaction so the stored counts always
    /// match a single snapshot of the result rows.
    pub async fn persist_rollup(&self, run_id: &str) -> Result<RunRollup, StoreError> {
        let tx = self.db().conn().transaction().await?;

        let mut rows = tx
            .query(
                "SELECT status FROM check_results WHERE run_id = ?1",
                [run_id],
            )
            .await?;
        let mut statuses: Vec<ResultStatus> = Vec::new();
        while let Some(row) = rows.next().await? {
            statuses.push(parse_enum(&row.get::<String>(0)?)?);
        }
        drop(rows);

        let rollup = RunRollup::from_statuses(statuses);
        let counts = rollup.counts;
        let affected = tx
            .execute(
                "UPDATE audit_runs SET
                    status = ?1, total_items = ?2, blocked_count = ?3, fail_count = ?4,
                    warning_count = ?5, pass_count = ?6, unchecked_count = ?7, last_run_at = ?8
                 WHERE id = ?9",
                libsql::params![
                    rollup.status.as_str(),
                    to_i64(counts.total)?,
                    to_i64(counts.blocked)?,
                    to_i64(counts.fail)?,
                    to_i64(counts.warning)?,
                    to_i64(counts.pass)?,
                    to_i64(counts.unchecked)?,
                    Utc::now().to_rfc3339(),
                    run_id
                ],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::NoResult);
        }

        tx.commit().await?;
        tracing::debug!(run_id, status = %rollup.status, total = counts.total, "rollup persisted");
        Ok(rollup)
    }
}
