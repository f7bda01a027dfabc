//! # vigil-engine
//!
//! Runs a check template against a target database and records the results.
//!
//! A run is driven by [`Dispatcher::run_checks`]: it opens one read-only
//! connection to the target, executes every automatic item node in tree
//! order, writes a [`vigil_core::entities::CheckExecution`] per node and
//! finishes with the run rollup. Operator SQL passes through [`guard`] and
//! [`executor`] before reaching the target; built-in checks read a
//! [`target::catalog::CatalogSnapshot`] loaded once per run.

pub mod builtin;
pub mod dispatcher;
pub mod error;
pub mod evaluate;
pub mod executor;
pub mod guard;
pub mod interpolate;
pub mod mapper;
pub mod pg_array;
pub mod preview;
pub mod target;
pub mod template;

pub use dispatcher::{Dispatcher, NodeSelection, RunRequest, RunSummary};
pub use error::{CheckError, EngineError};
pub use executor::QueryLimits;
pub use preview::{SqlPreview, preview_sql};
pub use target::postgres::{PgTarget, PgTargetProvider};
pub use target::{TargetConnInfo, TargetDatabase, TargetProvider};
