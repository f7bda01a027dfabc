//! Catalog snapshot of the audited schemas.
//!
//! Loaded at most once per run and shared read-only by the built-in checks.
//! The SQL below reads `pg_catalog` directly; every name is cast to `text`
//! and every query takes the schema list as `$1::text[]`.

use serde::Serialize;

use vigil_core::entities::RelationshipTarget;

use crate::error::CheckError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    pub tables: Vec<TableInfo>,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub indexes: Vec<IndexInfo>,
}

/// Ordinary or partitioned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub has_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub ordinal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub child_schema: String,
    pub child_table: String,
    pub child_cols: Vec<String>,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_cols: Vec<String>,
}

impl ForeignKeyInfo {
    pub fn to_target(&self) -> Result<RelationshipTarget, CheckError> {
        RelationshipTarget::new(
            (
                self.child_schema.clone(),
                self.child_table.clone(),
                self.child_cols.clone(),
            ),
            (
                self.parent_schema.clone(),
                self.parent_table.clone(),
                self.parent_cols.clone(),
            ),
            Some(self.name.clone()),
        )
        .map_err(|e| CheckError::Catalog(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Key columns in index order. `None` marks an expression column.
    pub columns: Vec<Option<String>>,
    /// Valid and ready; invalid indexes never support a foreign key.
    pub is_valid: bool,
}

impl IndexInfo {
    /// Whether `cols` is an order-sensitive prefix of this index's key columns.
    #[must_use]
    pub fn covers_prefix(&self, cols: &[String]) -> bool {
        self.is_valid
            && cols.len() <= self.columns.len()
            && cols
                .iter()
                .zip(&self.columns)
                .all(|(want, have)| have.as_deref() == Some(want.as_str()))
    }
}

impl CatalogSnapshot {
    pub fn indexes_on<'a>(
        &'a self,
        schema: &'a str,
        table: &'a str,
    ) -> impl Iterator<Item = &'a IndexInfo> + 'a {
        self.indexes
            .iter()
            .filter(move |i| i.schema == schema && i.table == table)
    }
}

pub const TABLES_SQL: &str = "
SELECT n.nspname::text AS schema_name,
       c.relname::text AS table_name,
       EXISTS (
           SELECT 1 FROM pg_constraint con
           WHERE con.conrelid = c.oid AND con.contype = 'p'
       ) AS has_primary_key
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE c.relkind IN ('r', 'p')
  AND NOT c.relispartition
  AND n.nspname = ANY($1::text[])
ORDER BY 1, 2";

pub const COLUMNS_SQL: &str = "
SELECT n.nspname::text AS schema_name,
       c.relname::text AS table_name,
       a.attname::text AS column_name,
       format_type(a.atttypid, a.atttypmod) AS data_type,
       NOT a.attnotnull AS is_nullable,
       a.attnum::int4 AS ordinal
FROM pg_attribute a
JOIN pg_class c ON c.oid = a.attrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE c.relkind IN ('r', 'p')
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND n.nspname = ANY($1::text[])
ORDER BY 1, 2, a.attnum";

pub const FOREIGN_KEYS_SQL: &str = "
SELECT con.conname::text AS fk_name,
       n_child.nspname::text AS child_schema,
       c_child.relname::text AS child_table,
       array_agg(a_child.attname::text ORDER BY x.ord) AS child_cols,
       n_parent.nspname::text AS parent_schema,
       c_parent.relname::text AS parent_table,
       array_agg(a_parent.attname::text ORDER BY x.ord) AS parent_cols
FROM pg_constraint con
JOIN pg_class c_child ON c_child.oid = con.conrelid
JOIN pg_namespace n_child ON n_child.oid = c_child.relnamespace
JOIN pg_class c_parent ON c_parent.oid = con.confrelid
JOIN pg_namespace n_parent ON n_parent.oid = c_parent.relnamespace
JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS x(attnum, ord) ON true
JOIN pg_attribute a_child ON a_child.attrelid = c_child.oid AND a_child.attnum = x.attnum
JOIN LATERAL unnest(con.confkey) WITH ORDINALITY AS y(attnum, ord) ON y.ord = x.ord
JOIN pg_attribute a_parent ON a_parent.attrelid = c_parent.oid AND a_parent.attnum = y.attnum
WHERE con.contype = 'f'
  AND n_child.nspname = ANY($1::text[])
GROUP BY con.oid, con.conname, n_child.nspname, c_child.relname, n_parent.nspname, c_parent.relname
ORDER BY 2, 3, 1";

pub const INDEXES_SQL: &str = "
SELECT n.nspname::text AS schema_name,
       t.relname::text AS table_name,
       ic.relname::text AS index_name,
       (i.indisvalid AND i.indisready) AS is_valid,
       array_agg(a.attname::text ORDER BY k.ord) AS key_columns
FROM pg_index i
JOIN pg_class t ON t.oid = i.indrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
JOIN pg_class ic ON ic.oid = i.indexrelid
CROSS JOIN LATERAL unnest(i.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
LEFT JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = k.attnum AND k.attnum > 0
WHERE n.nspname = ANY($1::text[])
  AND k.ord <= i.indnkeyatts
GROUP BY n.nspname, t.relname, ic.relname, i.indisvalid, i.indisready
ORDER BY 1, 2, 3";
