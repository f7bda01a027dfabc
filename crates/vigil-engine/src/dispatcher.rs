//! Runs every automatic check of one audit run.
//!
//! ```text
//! connect → initializing (ensure results) → running (execute items)
//!         → release → rollup → completed
//! ```
//!
//! Per-check failures become `blocked` results; only target, store, and
//! lookup failures end the run. A run that fails after connecting is put
//! back to `initializing` so it never rests in `running`.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value};

use vigil_config::EngineConfig;
use vigil_core::entities::{AuditRun, CheckDescriptor, CheckExecution, CheckNode, PassFailRule};
use vigil_core::enums::{BuiltinCheck, RunPhase};
use vigil_core::rollup::RunRollup;
use vigil_store::AuditStore;
use vigil_store::error::StoreError;

use crate::builtin;
use crate::error::{CheckError, EngineError};
use crate::evaluate::{CheckFindings, duration_ms};
use crate::executor::QueryLimits;
use crate::target::catalog::CatalogSnapshot;
use crate::target::{TargetConnInfo, TargetDatabase, TargetProvider};
use crate::template::{run_template_check, run_variables};

/// Which item nodes to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeSelection {
    #[default]
    All,
    Items(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub run_id: String,
    pub target: TargetConnInfo,
    pub schemas: Vec<String>,
    pub selection: NodeSelection,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// No executed check errored.
    pub ok: bool,
    pub run_id: String,
    pub rollup: RunRollup,
    pub executed: usize,
    pub errored: usize,
}

pub struct Dispatcher<'s, P> {
    store: &'s AuditStore,
    provider: P,
    config: EngineConfig,
}

/// Execution-time state owned by one run.
struct RunContext<'t, T> {
    target: &'t mut T,
    schemas: &'t [String],
    vars: Map<String, Value>,
    limits: QueryLimits,
    catalog: Option<Result<Arc<CatalogSnapshot>, CheckError>>,
}

impl<T: TargetDatabase> RunContext<'_, T> {
    /// Load the snapshot on first use; a failure is kept and returned again.
    async fn catalog(&mut self) -> Result<Arc<CatalogSnapshot>, CheckError> {
        if self.catalog.is_none() {
            let loaded = self
                .target
                .catalog(self.schemas, self.limits.statement_timeout)
                .await
                .map(Arc::new);
            if let Err(err) = &loaded {
                tracing::warn!(error = %err, "catalog snapshot failed");
            }
            self.catalog = Some(loaded);
        }
        self.catalog
            .clone()
            .unwrap_or_else(|| Err(CheckError::Catalog("snapshot not loaded".into())))
    }
}

impl<'s, P: TargetProvider> Dispatcher<'s, P> {
    #[must_use]
    pub const fn new(store: &'s AuditStore, provider: P, config: EngineConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Execute the run's checks and persist results plus rollup.
    ///
    /// # Errors
    ///
    /// `RunNotFound` for an unknown run, `TargetUnavailable` when the target
    /// cannot be reached (nothing is written), `Store` on persistence
    /// failures. Once the target is opened it is released exactly once, and
    /// on any later error the run phase goes back to `initializing`.
    pub async fn run_checks(&self, request: RunRequest) -> Result<RunSummary, EngineError> {
        let run = match self.store.get_run(&request.run_id).await {
            Ok(run) => run,
            Err(StoreError::NoResult) => return Err(EngineError::RunNotFound(request.run_id)),
            Err(err) => return Err(err.into()),
        };

        let mut target = self.provider.connect(&request.target).await?;
        tracing::info!(run_id = %run.id, schemas = ?request.schemas, "target connected");

        let outcome = self.execute(&run, &request, &mut target).await;
        target.release().await;

        let summary = match outcome {
            Ok(counts) => self.complete(&run.id, counts).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &summary {
            tracing::warn!(run_id = %run.id, error = %err, "run aborted");
            self.reset_phase(&run.id).await;
        }
        summary
    }

    async fn complete(
        &self,
        run_id: &str,
        (executed, errored): (usize, usize),
    ) -> Result<RunSummary, EngineError> {
        let rollup = self.store.persist_rollup(run_id).await?;
        self.store.set_run_phase(run_id, RunPhase::Completed).await?;
        tracing::info!(
            run_id,
            status = %rollup.status,
            executed,
            errored,
            "run completed"
        );

        Ok(RunSummary {
            ok: errored == 0,
            run_id: run_id.to_string(),
            rollup,
            executed,
            errored,
        })
    }

    async fn reset_phase(&self, run_id: &str) {
        if let Err(err) = self.store.set_run_phase(run_id, RunPhase::Initializing).await {
            tracing::warn!(run_id, error = %err, "run phase not reset");
        }
    }

    async fn execute(
        &self,
        run: &AuditRun,
        request: &RunRequest,
        target: &mut P::Target,
    ) -> Result<(usize, usize), EngineError> {
        self.store
            .set_run_phase(&run.id, RunPhase::Initializing)
            .await?;
        let all_items = self.store.list_check_items(&run.version_id, None).await?;
        let created = self.store.ensure_results(&run.id, &all_items).await?;
        tracing::info!(run_id = %run.id, items = all_items.len(), created, "run initialized");

        let items = match &request.selection {
            NodeSelection::All => all_items,
            NodeSelection::Items(ids) => {
                self.store
                    .list_check_items(&run.version_id, Some(ids.as_slice()))
                    .await?
            }
        };

        self.store.set_run_phase(&run.id, RunPhase::Running).await?;
        let mut ctx = RunContext {
            target,
            schemas: &request.schemas,
            vars: run_variables(&request.schemas),
            limits: QueryLimits::from_config(&self.config),
            catalog: None,
        };

        let mut executed = 0;
        let mut errored = 0;
        for node in items.iter().filter(|n| n.is_automatic()) {
            let started = Instant::now();
            let execution = match self.execute_node(node, &mut ctx).await {
                Ok((findings, rule)) => {
                    findings.into_execution(&rule, node.severity, started.elapsed())
                }
                Err(err) => {
                    tracing::warn!(node_id = %node.id, error = %err, "check errored");
                    errored += 1;
                    CheckExecution::errored(
                        node.severity,
                        err.to_string(),
                        duration_ms(started.elapsed()),
                    )
                }
            };
            tracing::debug!(
                node_id = %node.id,
                status = %execution.status,
                duration_ms = execution.duration_ms,
                "check executed"
            );
            self.store
                .upsert_result(&run.id, &node.id, &execution)
                .await?;
            executed += 1;
        }

        Ok((executed, errored))
    }

    async fn execute_node(
        &self,
        node: &CheckNode,
        ctx: &mut RunContext<'_, P::Target>,
    ) -> Result<(CheckFindings, PassFailRule), CheckError> {
        let sample_rows = self.config.sample_rows;
        match &node.check {
            Some(CheckDescriptor::Builtin { code }) => {
                let catalog = ctx.catalog().await?;
                let findings = match code {
                    BuiltinCheck::NoPrimaryKey => builtin::no_primary_key(&catalog, sample_rows),
                    BuiltinCheck::FkNotIndexed => builtin::fk_not_indexed(&catalog, sample_rows)?,
                    BuiltinCheck::FkHasViolations => {
                        builtin::fk_has_violations(
                            ctx.target,
                            &catalog,
                            ctx.limits,
                            self.config.fk_sample_limit,
                            sample_rows,
                        )
                        .await?
                    }
                };
                Ok((findings, PassFailRule::default()))
            }
            Some(CheckDescriptor::SqlTemplate(check)) => {
                let findings =
                    run_template_check(ctx.target, check, &ctx.vars, ctx.limits, sample_rows)
                        .await?;
                Ok((findings, check.rule))
            }
            Some(CheckDescriptor::Unsupported { code }) => {
                Err(CheckError::UnknownCheck(code.clone()))
            }
            None => Err(CheckError::UnknownCheck(format!(
                "node {} has no check",
                node.id
            ))),
        }
    }
}
