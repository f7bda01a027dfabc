//! Audit run repository: creation, lookup, and phase transitions.

use chrono::Utc;

use vigil_core::entities::AuditRun;
use vigil_core::enums::RunPhase;
use vigil_core::errors::CoreError;
use vigil_core::ids::PREFIX_RUN;
use vigil_core::rollup::{RollupCounts, RunRollup};

use crate::error::StoreError;
use crate::helpers::{get_opt_string, get_u64, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::AuditStore;

const SELECT_COLS: &str = "id, version_id, phase, status, total_items, blocked_count, \
     fail_count, warning_count, pass_count, unchecked_count, last_run_at, created_at";

fn row_to_run(row: &libsql::Row) -> Result<AuditRun, StoreError> {
    let rollup = match get_opt_string(row, 3)? {
        Some(status) => Some(RunRollup {
            status: parse_enum(&status)?,
            counts: RollupCounts {
                total: get_u64(row, 4)?,
                blocked: get_u64(row, 5)?,
                fail: get_u64(row, 6)?,
                warning: get_u64(row, 7)?,
                pass: get_u64(row, 8)?,
                unchecked: get_u64(row, 9)?,
            },
        }),
        None => None,
    };

    Ok(AuditRun {
        id: row.get(0)?,
        version_id: row.get(1)?,
        phase: parse_enum(&row.get::<String>(2)?)?,
        rollup,
        last_run_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl AuditStore {
    pub async fn create_run(&self, version_id: &str) -> Result<AuditRun, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT 1 FROM template_versions WHERE id = ?1", [version_id])
            .await?;
        if rows.next().await?.is_none() {
            return Err(StoreError::InvalidState(format!(
                "unknown template version '{version_id}'"
            )));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_RUN).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO audit_runs (id, version_id, phase, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    id.as_str(),
                    version_id,
                    RunPhase::Initializing.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(AuditRun {
            id,
            version_id: version_id.to_string(),
            phase: RunPhase::Initializing,
            rollup: None,
            last_run_at: None,
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `StoreError::NoResult` if no run has this id.
    pub async fn get_run(&self, id: &str) -> Result<AuditRun, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM audit_runs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        row_to_run(&row)
    }

    /// Runs of a template version, newest first.
    pub async fn list_runs(&self, version_id: &str) -> Result<Vec<AuditRun>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_runs WHERE version_id = ?1
                     ORDER BY created_at DESC, id"
                ),
                [version_id],
            )
            .await?;

        let mut runs = Vec::new();
        while let Some(row) = rows.next().await? {
            runs.push(row_to_run(&row)?);
        }
        Ok(runs)
    }

    /// Move a run to `phase`, enforcing the phase state machine.
    pub async fn set_run_phase(&self, run_id: &str, phase: RunPhase) -> Result<(), StoreError> {
        let current = self.get_run(run_id).await?.phase;
        if !current.can_transition_to(phase) {
            return Err(StoreError::InvalidState(
                CoreError::InvalidTransition {
                    entity_type: "audit_run".into(),
                    id: run_id.to_string(),
                    from: current.to_string(),
                    to: phase.to_string(),
                }
                .to_string(),
            ));
        }

        self.db()
            .conn()
            .execute(
                "UPDATE audit_runs SET phase = ?1 WHERE id = ?2",
                libsql::params![phase.as_str(), run_id],
            )
            .await?;
        tracing::debug!(run_id, %phase, "run phase changed");
        Ok(())
    }

    /// Delete a run; its results go with it.
    pub async fn delete_run(&self, run_id: &str) -> Result<(), StoreError> {
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM audit_runs WHERE id = ?1", [run_id])
            .await?;
        if affected == 0 {
            return Err(StoreError::NoResult);
        }
        Ok(())
    }
}
