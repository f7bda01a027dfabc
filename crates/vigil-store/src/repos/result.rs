//! Check result repository.
//!
//! One row per (run, item node). Rows are created `unchecked` when a run is
//! initialized and overwritten in place by every execution.

use vigil_core::entities::{CheckExecution, CheckNode, CheckResult};
use vigil_core::enums::{ResultStatus, RunType};

use crate::error::StoreError;
use crate::helpers::{
    get_opt_string, get_u64, parse_enum, parse_optional_datetime, parse_optional_json, to_i64,
    to_json_text,
};
use crate::service::AuditStore;

const SELECT_COLS: &str = "run_id, node_id, status, severity, run_type, targets, output, \
     issue_count, pass_count, duration_ms, executed_at";

fn row_to_result(row: &libsql::Row) -> Result<CheckResult, StoreError> {
    let duration_ms = row
        .get::<Option<i64>>(9)?
        .map(|ms| {
            u64::try_from(ms)
                .map_err(|_| StoreError::InvalidState(format!("negative duration {ms}")))
        })
        .transpose()?;

    Ok(CheckResult {
        run_id: row.get(0)?,
        node_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        severity: parse_enum(&row.get::<String>(3)?)?,
        run_type: parse_enum(&row.get::<String>(4)?)?,
        targets: parse_optional_json(get_opt_string(row, 5)?.as_deref())?.unwrap_or_default(),
        output: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        issue_count: get_u64(row, 7)?,
        pass_count: get_u64(row, 8)?,
        duration_ms,
        executed_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
    })
}

const fn run_type_of(node: &CheckNode) -> RunType {
    if node.is_automatic() {
        RunType::Automatic
    } else {
        RunType::Manual
    }
}

impl AuditStore {
    /// Insert an `unchecked` result for every item that has none yet.
    ///
    /// Existing rows are left untouched. Returns the number of rows created.
    pub async fn ensure_results(
        &self,
        run_id: &str,
        items: &[CheckNode],
    ) -> Result<u64, StoreError> {
        let tx = self.db().conn().transaction().await?;
        let mut created = 0;
        for node in items {
            created += tx
                .execute(
                    "INSERT INTO check_results (run_id, node_id, status, severity, run_type)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (run_id, node_id) DO NOTHING",
                    libsql::params![
                        run_id,
                        node.id.as_str(),
                        ResultStatus::Unchecked.as_str(),
                        node.severity.as_str(),
                        run_type_of(node).as_str()
                    ],
                )
                .await?;
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Write one execution into the node's result row.
    pub async fn upsert_result(
        &self,
        run_id: &str,
        node_id: &str,
        execution: &CheckExecution,
    ) -> Result<(), StoreError> {
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO check_results ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT (run_id, node_id) DO UPDATE SET
                        status = excluded.status,
                        severity = excluded.severity,
                        run_type = excluded.run_type,
                        targets = excluded.targets,
                        output = excluded.output,
                        issue_count = excluded.issue_count,
                        pass_count = excluded.pass_count,
                        duration_ms = excluded.duration_ms,
                        executed_at = excluded.executed_at"
                ),
                libsql::params![
                    run_id,
                    node_id,
                    execution.status.as_str(),
                    execution.severity.as_str(),
                    RunType::Automatic.as_str(),
                    to_json_text(&execution.targets)?,
                    to_json_text(&execution.output)?,
                    to_i64(execution.issue_count())?,
                    to_i64(execution.pass_count())?,
                    to_i64(execution.duration_ms)?,
                    execution.executed_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// All results of a run, in the order their rows were created.
    pub async fn list_results(&self, run_id: &str) -> Result<Vec<CheckResult>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM check_results WHERE run_id = ?1 ORDER BY rowid"),
                [run_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_result(&row)?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vigil_core::entities::{CheckOutput, OutputStats, TargetRef};
    use vigil_core::enums::Severity;

    use super::*;
    use crate::test_support::{baseline_template, test_store};

    async fn seeded() -> (AuditStore, String, Vec<CheckNode>) {
        let store = test_store().await;
        let version = store.import_template(&baseline_template()).await.unwrap();
        let run = store.create_run(&version.version_id).await.unwrap();
        let items = store
            .list_check_items(&version.version_id, None)
            .await
            .unwrap();
        (store, run.id, items)
    }

    #[tokio::test]
    async fn ensure_results_is_idempotent() {
        let (store, run_id, items) = seeded().await;

        assert_eq!(store.ensure_results(&run_id, &items).await.unwrap(), 3);
        assert_eq!(store.ensure_results(&run_id, &items).await.unwrap(), 0);

        let results = store.list_results(&run_id).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == ResultStatus::Unchecked));
        let run_types: Vec<RunType> = results.iter().map(|r| r.run_type).collect();
        assert_eq!(
            run_types,
            vec![RunType::Automatic, RunType::Automatic, RunType::Manual]
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let (store, run_id, items) = seeded().await;
        store.ensure_results(&run_id, &items).await.unwrap();
        let node_id = items[0].id.as_str();

        let mut execution = CheckExecution {
            status: ResultStatus::Fail,
            severity: Severity::Error,
            targets: vec![TargetRef::table("public", "audit_log")],
            output: CheckOutput {
                summary: "1 tables missing primary key".into(),
                stats: OutputStats {
                    row_count: 1,
                    truncated: false,
                    total_violating_rows: None,
                },
                rows: vec![json!({ "schema": "public", "table": "audit_log" })],
                error: None,
            },
            duration_ms: 7,
            executed_at: chrono::Utc::now(),
        };
        store.upsert_result(&run_id, node_id, &execution).await.unwrap();

        execution.status = ResultStatus::Pass;
        execution.targets.clear();
        execution.output.stats.row_count = 0;
        store.upsert_result(&run_id, node_id, &execution).await.unwrap();

        let results = store.list_results(&run_id).await.unwrap();
        assert_eq!(results.len(), 3);
        let first = &results[0];
        assert_eq!(first.node_id, node_id);
        assert_eq!(first.status, ResultStatus::Pass);
        assert_eq!(first.targets, vec![]);
        assert_eq!(first.pass_count, 1);
        assert_eq!(first.issue_count, 0);
        assert_eq!(first.duration_ms, Some(7));
        assert!(first.executed_at.is_some());
    }

    #[tokio::test]
    async fn deleting_run_cascades_results() {
        let (store, run_id, items) = seeded().await;
        store.ensure_results(&run_id, &items).await.unwrap();

        store.delete_run(&run_id).await.unwrap();
        assert!(store.list_results(&run_id).await.unwrap().is_empty());
    }
}
