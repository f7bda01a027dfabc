//! The audited database.
//!
//! The engine only ever sees a [`TargetDatabase`]: one connection, scoped to
//! one run, that runs read-only statements and loads catalog snapshots.
//! [`postgres`] provides the sqlx implementation.

pub mod catalog;
pub mod postgres;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CheckError, EngineError};
use catalog::CatalogSnapshot;

/// One result row, keyed by column name.
pub type Row = Map<String, Value>;

/// Name and database type name of a result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Raw output of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
    /// More rows were available than were read.
    pub truncated: bool,
}

/// How to reach the target database.
#[derive(Clone)]
pub struct TargetConnInfo {
    pub database_url: String,
    pub connect_timeout: Duration,
}

impl TargetConnInfo {
    pub fn new(database_url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            database_url: database_url.into(),
            connect_timeout,
        }
    }
}

// The URL usually carries a password.
impl fmt::Debug for TargetConnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConnInfo")
            .field("database_url", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// An open connection to the audited database.
pub trait TargetDatabase: Send {
    /// Run one statement read-only under `timeout`, reading at most `max_rows` rows.
    fn query(
        &mut self,
        sql: &str,
        timeout: Duration,
        max_rows: usize,
    ) -> impl Future<Output = Result<QueryOutput, CheckError>> + Send;

    /// Load tables, columns, foreign keys, and indexes of `schemas`.
    fn catalog(
        &mut self,
        schemas: &[String],
        timeout: Duration,
    ) -> impl Future<Output = Result<CatalogSnapshot, CheckError>> + Send;

    /// Close the connection. Consumes the handle so it cannot run twice.
    fn release(self) -> impl Future<Output = ()> + Send;
}

/// Opens target connections.
pub trait TargetProvider: Sync {
    type Target: TargetDatabase;

    fn connect(
        &self,
        info: &TargetConnInfo,
    ) -> impl Future<Output = Result<Self::Target, EngineError>> + Send;
}
