//! Postgres target over a single sqlx connection per run.
//!
//! Every statement gets its own transaction: `READ ONLY`, with a
//! transaction-local `statement_timeout`, always rolled back. Operator SQL
//! goes over the simple query protocol so every value arrives as text and is
//! decoded by its type name.

use std::time::Duration;

use futures::TryStreamExt;
use serde_json::{Number, Value};
use sqlx::postgres::{PgColumn, PgConnectOptions, PgConnection, PgRow};
use sqlx::{
    Column, Connection, Decode, Executor, Postgres, Row as _, Statement, Transaction, TypeInfo,
    ValueRef,
};

use super::catalog::{
    COLUMNS_SQL, CatalogSnapshot, ColumnInfo, FOREIGN_KEYS_SQL, ForeignKeyInfo, INDEXES_SQL,
    IndexInfo, TABLES_SQL, TableInfo,
};
use super::{ColumnMeta, QueryOutput, Row, TargetConnInfo, TargetDatabase, TargetProvider};
use crate::error::{CheckError, EngineError};
use crate::pg_array::parse_array_literal;

/// SQLSTATE `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

/// Opens one [`PgTarget`] per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgTargetProvider;

impl TargetProvider for PgTargetProvider {
    type Target = PgTarget;

    async fn connect(&self, info: &TargetConnInfo) -> Result<PgTarget, EngineError> {
        let options: PgConnectOptions = info
            .database_url
            .parse()
            .map_err(|e: sqlx::Error| EngineError::TargetUnavailable(e.to_string()))?;
        let options = options.application_name("vigil");

        let conn = tokio::time::timeout(info.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                EngineError::TargetUnavailable(format!(
                    "connection timed out after {}s",
                    info.connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| EngineError::TargetUnavailable(e.to_string()))?;

        Ok(PgTarget { conn })
    }
}

pub struct PgTarget {
    conn: PgConnection,
}

impl TargetDatabase for PgTarget {
    async fn query(
        &mut self,
        sql: &str,
        timeout: Duration,
        max_rows: usize,
    ) -> Result<QueryOutput, CheckError> {
        let mut tx = begin_read_only(&mut self.conn, timeout).await?;
        let outcome = read_rows(&mut tx, sql, max_rows).await;
        finish(tx).await;
        outcome
    }

    async fn catalog(
        &mut self,
        schemas: &[String],
        timeout: Duration,
    ) -> Result<CatalogSnapshot, CheckError> {
        let mut tx = begin_read_only(&mut self.conn, timeout)
            .await
            .map_err(|e| CheckError::Catalog(e.to_string()))?;
        let outcome = load_catalog(&mut tx, schemas)
            .await
            .map_err(|e| CheckError::Catalog(classify(e).to_string()));
        finish(tx).await;
        outcome
    }

    async fn release(self) {
        if let Err(err) = self.conn.close().await {
            tracing::warn!(error = %err, "closing target connection failed");
        }
    }
}

async fn begin_read_only(
    conn: &mut PgConnection,
    timeout: Duration,
) -> Result<Transaction<'_, Postgres>, CheckError> {
    let mut tx = conn.begin().await.map_err(classify)?;
    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
    sqlx::query("SELECT set_config('statement_timeout', $1, true)")
        .bind(format!("{}ms", timeout.as_millis()))
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
    Ok(tx)
}

/// Roll back; nothing a check runs is ever kept.
async fn finish(tx: Transaction<'_, Postgres>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "rollback on target failed");
    }
}

fn classify(err: sqlx::Error) -> CheckError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            CheckError::QueryTimeout
        }
        sqlx::Error::Database(db) => CheckError::ExecutionError(db.message().to_string()),
        _ => CheckError::ExecutionError(err.to_string()),
    }
}

async fn read_rows(
    conn: &mut PgConnection,
    sql: &str,
    max_rows: usize,
) -> Result<QueryOutput, CheckError> {
    let mut output = QueryOutput::default();
    let mut stream = sqlx::raw_sql(sql).fetch(&mut *conn);

    while let Some(row) = stream.try_next().await.map_err(classify)? {
        if output.rows.len() >= max_rows {
            output.truncated = true;
            break;
        }
        if output.columns.is_empty() {
            output.columns = column_meta(row.columns());
        }
        output.rows.push(decode_row(&row)?);
    }
    drop(stream);

    if output.rows.is_empty() {
        output.columns = describe_columns(conn, sql).await;
    }

    Ok(output)
}

fn column_meta(columns: &[PgColumn]) -> Vec<ColumnMeta> {
    columns
        .iter()
        .map(|c| ColumnMeta::new(c.name(), c.type_info().name()))
        .collect()
}

/// Column metadata for a statement that produced no rows.
///
/// The statement is only described, never executed again. A statement that
/// cannot be prepared yields no columns.
async fn describe_columns(conn: &mut PgConnection, sql: &str) -> Vec<ColumnMeta> {
    match conn.prepare(sql).await {
        Ok(statement) => column_meta(statement.columns()),
        Err(err) => {
            tracing::debug!(error = %err, "describing empty result failed");
            Vec::new()
        }
    }
}

fn decode_row(row: &PgRow) -> Result<Row, CheckError> {
    let mut decoded = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx).map_err(classify)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let text = <&str as Decode<Postgres>>::decode(raw).map_err(|e| {
                CheckError::ExecutionError(format!("decoding column {}: {e}", column.name()))
            })?;
            typed_value(column.type_info().name(), text)
        };
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

/// JSON value for a text-format cell of the named type.
fn typed_value(type_name: &str, text: &str) -> Value {
    let fallback = || Value::String(text.to_string());

    if let Some(element) = type_name.strip_suffix("[]") {
        return parse_array_literal(text).map_or_else(fallback, |items| {
            Value::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(Value::Null, |t| typed_value(element, &t)))
                    .collect(),
            )
        });
    }

    match type_name {
        "BOOL" => match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => fallback(),
        },
        "INT2" | "INT4" | "INT8" | "OID" => text.parse::<i64>().map_or_else(|_| fallback(), Value::from),
        "FLOAT4" | "FLOAT8" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(fallback, Value::Number),
        "JSON" | "JSONB" => serde_json::from_str(text).unwrap_or_else(|_| fallback()),
        _ => fallback(),
    }
}

async fn load_catalog(
    conn: &mut PgConnection,
    schemas: &[String],
) -> Result<CatalogSnapshot, sqlx::Error> {
    let tables = sqlx::query(TABLES_SQL)
        .bind(schemas.to_vec())
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| {
            Ok(TableInfo {
                schema: row.try_get("schema_name")?,
                name: row.try_get("table_name")?,
                has_primary_key: row.try_get("has_primary_key")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    let columns = sqlx::query(COLUMNS_SQL)
        .bind(schemas.to_vec())
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| {
            Ok(ColumnInfo {
                schema: row.try_get("schema_name")?,
                table: row.try_get("table_name")?,
                name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
                is_nullable: row.try_get("is_nullable")?,
                ordinal: row.try_get("ordinal")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    let foreign_keys = sqlx::query(FOREIGN_KEYS_SQL)
        .bind(schemas.to_vec())
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| {
            Ok(ForeignKeyInfo {
                name: row.try_get("fk_name")?,
                child_schema: row.try_get("child_schema")?,
                child_table: row.try_get("child_table")?,
                child_cols: row.try_get("child_cols")?,
                parent_schema: row.try_get("parent_schema")?,
                parent_table: row.try_get("parent_table")?,
                parent_cols: row.try_get("parent_cols")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    let indexes = sqlx::query(INDEXES_SQL)
        .bind(schemas.to_vec())
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| {
            Ok(IndexInfo {
                schema: row.try_get("schema_name")?,
                table: row.try_get("table_name")?,
                name: row.try_get("index_name")?,
                columns: row.try_get("key_columns")?,
                is_valid: row.try_get("is_valid")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    tracing::debug!(
        tables = tables.len(),
        foreign_keys = foreign_keys.len(),
        indexes = indexes.len(),
        "catalog snapshot loaded"
    );
    Ok(CatalogSnapshot {
        tables,
        columns,
        foreign_keys,
        indexes,
    })
}
