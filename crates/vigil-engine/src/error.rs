//! Error types for check execution.
//!
//! `CheckError` is scoped to one check node and never aborts a run: the
//! dispatcher records it as a `blocked` result. `EngineError` ends the run.

use thiserror::Error;
use vigil_store::error::StoreError;

/// Failure of a single check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    /// A placeholder names something outside the variable whitelist.
    #[error("unsafe placeholder '{0}'")]
    UnsafePlaceholder(String),

    /// A whitelisted variable is absent or null.
    #[error("missing template variable '{0}'")]
    MissingVariable(String),

    /// An identifier variable holds characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid identifier for '{name}': {value:?}")]
    InvalidIdentifier { name: String, value: String },

    /// The statement contains a mutating keyword.
    #[error("write operation forbidden: {0}")]
    WriteOperationForbidden(String),

    #[error("only SELECT, WITH, or EXPLAIN statements may run")]
    NotAReadQuery,

    #[error("multiple statements are not allowed")]
    MultiStatement,

    /// The target cancelled the statement at its timeout.
    #[error("query exceeded the statement timeout")]
    QueryTimeout,

    /// Any other driver error, message preserved.
    #[error("query failed: {0}")]
    ExecutionError(String),

    /// A mapped column is missing, null, or not decodable.
    #[error("invalid target encoding in column '{column}': {reason}")]
    InvalidTargetEncoding { column: String, reason: String },

    #[error("unknown check code '{0}'")]
    UnknownCheck(String),

    /// `fail_if_gt` is at or above the row cap, so it can never be exceeded.
    #[error("fail_if_gt {threshold} is unreachable with a row cap of {row_cap}")]
    UnreachableThreshold { threshold: u64, row_cap: usize },

    /// The run's catalog snapshot could not be loaded.
    #[error("catalog unavailable: {0}")]
    Catalog(String),
}

/// Failure of a whole audit run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The target connection could not be acquired.
    #[error("target database unavailable: {0}")]
    TargetUnavailable(String),

    #[error("audit run '{0}' not found")]
    RunNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
