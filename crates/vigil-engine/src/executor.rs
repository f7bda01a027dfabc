//! Guarded execution: statement timeout plus row cap.
//!
//! The cap is enforced twice. A top-level `LIMIT <cap + 1>` is appended when
//! the statement has no `LIMIT`/`FETCH` of its own, and the returned rows are
//! truncated to the cap regardless of what the target sent back. The extra
//! row is what marks a result as truncated.

use std::time::{Duration, Instant};

use vigil_config::EngineConfig;

use crate::error::CheckError;
use crate::guard::ensure_read_only;
use crate::target::{ColumnMeta, Row, TargetDatabase};

/// Guardrails for one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub statement_timeout: Duration,
    pub row_cap: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl QueryLimits {
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            statement_timeout: config.statement_timeout(),
            row_cap: config.row_cap,
        }
    }

    #[must_use]
    pub const fn with_row_cap(self, row_cap: usize) -> Self {
        Self { row_cap, ..self }
    }
}

/// Rows and metadata of one guarded statement.
#[derive(Debug, Clone)]
pub struct ExecutedQuery {
    /// The statement as sent, including the appended `LIMIT <cap + 1>`.
    pub sql: String,
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
    pub truncated: bool,
    pub duration: Duration,
}

impl ExecutedQuery {
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    /// Column names, from metadata or else from the first row.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        if self.columns.is_empty() {
            self.rows
                .first()
                .map(|row| row.keys().map(String::as_str).collect())
                .unwrap_or_default()
        } else {
            self.columns.iter().map(|c| c.name.as_str()).collect()
        }
    }
}

/// Guard, cap, and run an operator-supplied statement.
pub async fn execute_guarded<T: TargetDatabase>(
    target: &mut T,
    sql: &str,
    limits: QueryLimits,
) -> Result<ExecutedQuery, CheckError> {
    ensure_read_only(sql)?;
    execute_with_limits(target, sql, limits).await
}

/// Cap and run a statement generated by the engine itself.
pub async fn execute_with_limits<T: TargetDatabase>(
    target: &mut T,
    sql: &str,
    limits: QueryLimits,
) -> Result<ExecutedQuery, CheckError> {
    let capped = apply_row_cap(sql, limits.row_cap.saturating_add(1));
    let started = Instant::now();
    let output = target
        .query(&capped, limits.statement_timeout, limits.row_cap)
        .await?;
    let duration = started.elapsed();

    let mut rows = output.rows;
    let truncated = output.truncated || rows.len() > limits.row_cap;
    rows.truncate(limits.row_cap);

    tracing::trace!(rows = rows.len(), truncated, ?duration, "statement finished");
    Ok(ExecutedQuery {
        sql: capped,
        columns: output.columns,
        rows,
        truncated,
        duration,
    })
}

/// Append `LIMIT <cap>` unless the statement already limits itself.
#[must_use]
pub fn apply_row_cap(sql: &str, cap: usize) -> String {
    if has_top_level_limit(sql) {
        return sql.to_string();
    }
    let body = sql.trim_end().trim_end_matches(';').trim_end();
    format!("{body}\nLIMIT {cap}")
}

/// Whether `LIMIT` or `FETCH` appears outside parentheses, quotes, and comments.
#[must_use]
pub fn has_top_level_limit(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
            }
            b'$' => i = skip_dollar_quoted(sql, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let word = &sql[start..i];
                if depth == 0
                    && (word.eq_ignore_ascii_case("LIMIT") || word.eq_ignore_ascii_case("FETCH"))
                {
                    return true;
                }
            }
            _ => i += 1,
        }
    }
    false
}

/// Skip a `'...'` or `"..."` run; doubled delimiters stay inside.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip `$tag$ ... $tag$`. A lone `$` (e.g. `$1`) is a single byte.
fn skip_dollar_quoted(sql: &str, start: usize) -> usize {
    let rest = &sql[start + 1..];
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let is_tag = rest[tag_len..].starts_with('$')
        && !rest[..tag_len].starts_with(|c: char| c.is_ascii_digit());
    if !is_tag {
        return start + 1;
    }
    let delimiter = &sql[start..start + tag_len + 2];
    let body_start = start + delimiter.len();
    sql[body_start..]
        .find(delimiter)
        .map_or(sql.len(), |p| body_start + p + delimiter.len())
}
