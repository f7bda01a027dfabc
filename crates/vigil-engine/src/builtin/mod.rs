//! Built-in structural checks.
//!
//! `NO_PRIMARY_KEY` and `FK_NOT_INDEXED` are pure functions of the run's
//! catalog snapshot. `FK_HAS_VIOLATIONS` also queries the target, one count
//! per foreign key.

mod fk_not_indexed;
mod fk_violations;
mod no_primary_key;

pub use fk_not_indexed::fk_not_indexed;
pub use fk_violations::{count_sql, fk_has_violations, sample_sql};
pub use no_primary_key::no_primary_key;

use serde_json::{Value, json};

use crate::target::catalog::ForeignKeyInfo;

fn fk_json(fk: &ForeignKeyInfo) -> Value {
    json!({
        "fk_name": fk.name,
        "child_schema": fk.child_schema,
        "child_table": fk.child_table,
        "child_cols": fk.child_cols,
        "parent_schema": fk.parent_schema,
        "parent_table": fk.parent_table,
        "parent_cols": fk.parent_cols,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::target::catalog::{CatalogSnapshot, ForeignKeyInfo, IndexInfo, TableInfo};

    pub fn fk(name: &str, child: &str, cols: &[&str], parent: &str) -> ForeignKeyInfo {
        ForeignKeyInfo {
            name: name.into(),
            child_schema: "public".into(),
            child_table: child.into(),
            child_cols: cols.iter().map(|c| (*c).to_string()).collect(),
            parent_schema: "public".into(),
            parent_table: parent.into(),
            parent_cols: cols.iter().map(|_| "id".to_string()).collect(),
        }
    }

    pub fn index(table: &str, name: &str, cols: &[Option<&str>]) -> IndexInfo {
        IndexInfo {
            schema: "public".into(),
            table: table.into(),
            name: name.into(),
            columns: cols.iter().map(|c| c.map(String::from)).collect(),
            is_valid: true,
        }
    }

    pub fn table(name: &str, has_primary_key: bool) -> TableInfo {
        TableInfo {
            schema: "public".into(),
            name: name.into(),
            has_primary_key,
        }
    }

    pub fn shop() -> CatalogSnapshot {
        CatalogSnapshot {
            tables: vec![
                table("audit_log", false),
                table("customers", true),
                table("orders", true),
                table("order_lines", true),
            ],
            columns: vec![],
            foreign_keys: vec![
                fk("orders_customer_id_fkey", "orders", &["customer_id"], "customers"),
                fk("order_lines_order_id_fkey", "order_lines", &["order_id"], "orders"),
            ],
            indexes: vec![
                index("orders", "orders_pkey", &[Some("id")]),
                index("orders", "orders_customer_idx", &[Some("customer_id"), Some("placed_at")]),
                index("order_lines", "order_lines_pkey", &[Some("id")]),
            ],
        }
    }
}
