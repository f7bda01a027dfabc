//! Guarded SQL preview for template authoring.
//!
//! Runs a candidate template the same way a check would and reports what
//! came back, including the mapping that inference would pick.

use serde::Serialize;
use serde_json::{Map, Value};

use vigil_core::entities::ResultMapping;

use crate::error::CheckError;
use crate::evaluate::duration_ms;
use crate::executor::{QueryLimits, execute_guarded};
use crate::interpolate::interpolate;
use crate::mapper::suggest_mapping;
use crate::target::{ColumnMeta, Row, TargetDatabase};

#[derive(Debug, Clone, Serialize)]
pub struct SqlPreview {
    /// The statement as sent, including any appended `LIMIT`.
    pub sql: String,
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
    pub truncated: bool,
    pub suggested_mapping: Option<ResultMapping>,
    pub duration_ms: u64,
}

pub async fn preview_sql<T: TargetDatabase>(
    target: &mut T,
    template: &str,
    vars: &Map<String, Value>,
    limits: QueryLimits,
) -> Result<SqlPreview, CheckError> {
    let sql = interpolate(template, vars)?;
    let executed = execute_guarded(target, &sql, limits).await?;
    let suggested_mapping = suggest_mapping(&executed.column_names());

    Ok(SqlPreview {
        sql: executed.sql,
        columns: executed.columns,
        rows: executed.rows,
        truncated: executed.truncated,
        suggested_mapping,
        duration_ms: duration_ms(executed.duration),
    })
}
