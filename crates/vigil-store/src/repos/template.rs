//! Template repository: imported check trees and the ordered item reader.

use std::collections::HashMap;

use serde::Serialize;

use vigil_core::entities::{
    CheckDescriptor, CheckNode, PassFailRule, SqlTemplateCheck, TemplateDocument,
};
use vigil_core::enums::NodeKind;
use vigil_core::ids::{PREFIX_NODE, PREFIX_VERSION};
use vigil_core::tree::tree_order;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_enum, parse_optional_json, to_json_text};
use crate::service::AuditStore;

const SELECT_COLS: &str = "id, version_id, parent_id, position, kind, title, severity, \
     check_code, sql_template, result_mapping, pass_fail_rule, params";

/// A template version created by [`AuditStore::import_template`].
#[derive(Debug, Clone, Serialize)]
pub struct ImportedTemplate {
    pub version_id: String,
    pub name: String,
    pub nodes: Vec<CheckNode>,
}

fn row_to_node(row: &libsql::Row) -> Result<CheckNode, StoreError> {
    let check_code = get_opt_string(row, 7)?;
    let sql_template = get_opt_string(row, 8)?;
    let check = match (check_code, sql_template) {
        (Some(code), _) => Some(CheckDescriptor::from_code(&code)),
        (None, Some(template)) => Some(CheckDescriptor::SqlTemplate(SqlTemplateCheck {
            template,
            mapping: parse_optional_json(get_opt_string(row, 9)?.as_deref())?,
            rule: parse_optional_json(get_opt_string(row, 10)?.as_deref())?
                .unwrap_or_else(PassFailRule::default),
            params: parse_optional_json(get_opt_string(row, 11)?.as_deref())?
                .unwrap_or_default(),
        })),
        (None, None) => None,
    };

    Ok(CheckNode {
        id: row.get(0)?,
        version_id: row.get(1)?,
        parent_id: get_opt_string(row, 2)?,
        position: row.get(3)?,
        kind: parse_enum(&row.get::<String>(4)?)?,
        title: row.get(5)?,
        severity: parse_enum(&row.get::<String>(6)?)?,
        check,
    })
}

/// Column values for a descriptor: `(check_code, sql_template, mapping, rule, params)`.
type DescriptorColumns = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn descriptor_columns(check: Option<&CheckDescriptor>) -> Result<DescriptorColumns, StoreError> {
    Ok(match check {
        None => (None, None, None, None, None),
        Some(CheckDescriptor::Builtin { code }) => {
            (Some(code.as_str().to_string()), None, None, None, None)
        }
        Some(CheckDescriptor::Unsupported { code }) => (Some(code.clone()), None, None, None, None),
        Some(CheckDescriptor::SqlTemplate(t)) => (
            None,
            Some(t.template.clone()),
            t.mapping.as_ref().map(to_json_text).transpose()?,
            Some(to_json_text(&t.rule)?),
            Some(to_json_text(&t.params)?),
        ),
    })
}

impl AuditStore {
    pub async fn create_template_version(&self, name: &str) -> Result<String, StoreError> {
        let id = self.db().generate_id(PREFIX_VERSION).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO template_versions (id, name) VALUES (?1, ?2)",
                libsql::params![id.as_str(), name],
            )
            .await?;
        Ok(id)
    }

    /// Insert one node into an existing version.
    pub async fn insert_node(&self, node: &CheckNode) -> Result<(), StoreError> {
        let (check_code, sql_template, mapping, rule, params) =
            descriptor_columns(node.check.as_ref())?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO check_nodes ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    node.id.as_str(),
                    node.version_id.as_str(),
                    node.parent_id.as_deref(),
                    node.position,
                    node.kind.as_str(),
                    node.title.as_str(),
                    node.severity.as_str(),
                    check_code,
                    sql_template,
                    mapping,
                    rule,
                    params
                ],
            )
            .await?;
        Ok(())
    }

    /// Import a template document as a new version.
    ///
    /// Parents must appear before their children; sibling positions follow
    /// document order. The whole import is one transaction.
    pub async fn import_template(
        &self,
        doc: &TemplateDocument,
    ) -> Result<ImportedTemplate, StoreError> {
        let mut ids: HashMap<&str, String> = HashMap::new();
        let mut next_position: HashMap<Option<&str>, i64> = HashMap::new();
        let mut nodes = Vec::with_capacity(doc.nodes.len());

        let tx = self.db().conn().transaction().await?;
        let version_id = self.create_template_version(&doc.name).await?;

        for spec in &doc.nodes {
            if ids.contains_key(spec.key.as_str()) {
                return Err(StoreError::InvalidState(format!(
                    "duplicate node key '{}'",
                    spec.key
                )));
            }
            let parent_id = match spec.parent.as_deref() {
                Some(key) => Some(ids.get(key).cloned().ok_or_else(|| {
                    StoreError::InvalidState(format!(
                        "node '{}' references unknown parent '{key}'",
                        spec.key
                    ))
                })?),
                None => None,
            };
            if spec.kind == NodeKind::Group && spec.check.is_some() {
                return Err(StoreError::InvalidState(format!(
                    "group node '{}' cannot carry a check",
                    spec.key
                )));
            }

            let slot = next_position.entry(spec.parent.as_deref()).or_insert(0);
            let position = *slot;
            *slot += 1;

            let node = CheckNode {
                id: self.db().generate_id(PREFIX_NODE).await?,
                version_id: version_id.clone(),
                parent_id,
                position,
                kind: spec.kind,
                title: spec.title.clone(),
                severity: spec.severity,
                check: spec.check.clone(),
            };
            self.insert_node(&node).await?;
            ids.insert(spec.key.as_str(), node.id.clone());
            nodes.push(node);
        }

        tx.commit().await?;
        tracing::info!(version_id = %version_id, nodes = nodes.len(), "imported template");

        Ok(ImportedTemplate {
            version_id,
            name: doc.name.clone(),
            nodes,
        })
    }

    /// All nodes of a version in depth-first tree order.
    pub async fn list_nodes(&self, version_id: &str) -> Result<Vec<CheckNode>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM check_nodes WHERE version_id = ?1"),
                [version_id],
            )
            .await?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(row_to_node(&row)?);
        }
        Ok(tree_order(nodes))
    }

    /// Item nodes of a version in tree order, optionally narrowed to `selection`.
    ///
    /// Selected ids that are not items of this version are ignored.
    pub async fn list_check_items(
        &self,
        version_id: &str,
        selection: Option<&[String]>,
    ) -> Result<Vec<CheckNode>, StoreError> {
        let items = self
            .list_nodes(version_id)
            .await?
            .into_iter()
            .filter(|n| n.kind == NodeKind::Item)
            .filter(|n| selection.is_none_or(|ids| ids.contains(&n.id)));
        Ok(items.collect())
    }
}
