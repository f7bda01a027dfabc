//! Scripted target database shared by the engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value, json};

use vigil_core::entities::{
    CheckDescriptor, PassFailRule, SqlTemplateCheck, TemplateDocument, TemplateNodeSpec,
};
use vigil_core::enums::{BuiltinCheck, NodeKind, Severity};
use vigil_engine::target::catalog::{CatalogSnapshot, TableInfo};
use vigil_engine::target::{ColumnMeta, QueryOutput, Row};
use vigil_engine::{CheckError, EngineError, TargetConnInfo, TargetDatabase, TargetProvider};
use vigil_store::AuditStore;
use vigil_store::repos::template::ImportedTemplate;

/// What the fake target did over its lifetime.
#[derive(Debug, Default)]
pub struct TargetLog {
    pub connects: usize,
    pub releases: usize,
    pub catalog_calls: usize,
    pub statements: Vec<String>,
}

/// Canned answers. The first response whose needle occurs in the SQL wins.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub catalog: Option<Result<CatalogSnapshot, CheckError>>,
    pub responses: Vec<(String, Result<QueryOutput, CheckError>)>,
}

impl Script {
    pub fn with_catalog(mut self, catalog: Result<CatalogSnapshot, CheckError>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn respond(mut self, needle: &str, output: Result<QueryOutput, CheckError>) -> Self {
        self.responses.push((needle.to_string(), output));
        self
    }
}

/// A statement run against the result store when the target sees its first
/// query, to break the store mid-run.
#[derive(Clone)]
pub struct StoreFault {
    pub store: Arc<AuditStore>,
    pub statement: &'static str,
}

#[derive(Clone)]
pub struct ScriptedProvider {
    script: Script,
    log: Arc<Mutex<TargetLog>>,
    fail_connect: bool,
    store_fault: Option<StoreFault>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            log: Arc::default(),
            fail_connect: false,
            store_fault: None,
        }
    }

    pub fn with_store_fault(mut self, store: Arc<AuditStore>, statement: &'static str) -> Self {
        self.store_fault = Some(StoreFault { store, statement });
        self
    }

    pub fn unreachable() -> Self {
        Self {
            fail_connect: true,
            ..Self::new(Script::default())
        }
    }

    pub fn log(&self) -> Arc<Mutex<TargetLog>> {
        Arc::clone(&self.log)
    }
}

impl TargetProvider for ScriptedProvider {
    type Target = ScriptedTarget;

    async fn connect(&self, _info: &TargetConnInfo) -> Result<ScriptedTarget, EngineError> {
        if self.fail_connect {
            return Err(EngineError::TargetUnavailable(
                "connection refused".into(),
            ));
        }
        self.log.lock().unwrap().connects += 1;
        Ok(ScriptedTarget {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            store_fault: self.store_fault.clone(),
        })
    }
}

pub struct ScriptedTarget {
    script: Script,
    log: Arc<Mutex<TargetLog>>,
    store_fault: Option<StoreFault>,
}

impl TargetDatabase for ScriptedTarget {
    async fn query(
        &mut self,
        sql: &str,
        _timeout: Duration,
        _max_rows: usize,
    ) -> Result<QueryOutput, CheckError> {
        self.log.lock().unwrap().statements.push(sql.to_string());
        if let Some(fault) = self.store_fault.take() {
            fault
                .store
                .db()
                .conn()
                .execute(fault.statement, ())
                .await
                .unwrap();
        }
        self.script
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map_or_else(|| Ok(QueryOutput::default()), |(_, output)| output.clone())
    }

    async fn catalog(
        &mut self,
        _schemas: &[String],
        _timeout: Duration,
    ) -> Result<CatalogSnapshot, CheckError> {
        self.log.lock().unwrap().catalog_calls += 1;
        self.script
            .catalog
            .clone()
            .unwrap_or_else(|| Ok(CatalogSnapshot::default()))
    }

    async fn release(self) {
        self.log.lock().unwrap().releases += 1;
    }
}

pub fn conn_info() -> TargetConnInfo {
    TargetConnInfo::new("postgres://audit@localhost/shop", Duration::from_secs(1))
}

/// Rows with a single `email` column.
pub fn email_rows(emails: &[&str]) -> QueryOutput {
    QueryOutput {
        columns: vec![ColumnMeta::new("email", "TEXT")],
        rows: emails
            .iter()
            .map(|email| {
                let mut row = Row::new();
                row.insert("email".into(), json!(email));
                row
            })
            .collect(),
        truncated: false,
    }
}

/// `public.users` has a primary key, `public.audit_log` does not.
pub fn shop_catalog() -> CatalogSnapshot {
    let table = |name: &str, has_primary_key: bool| TableInfo {
        schema: "public".into(),
        name: name.into(),
        has_primary_key,
    };
    CatalogSnapshot {
        tables: vec![table("users", true), table("audit_log", false)],
        ..CatalogSnapshot::default()
    }
}

pub fn node(
    key: &str,
    parent: Option<&str>,
    kind: NodeKind,
    severity: Severity,
    check: Option<CheckDescriptor>,
) -> TemplateNodeSpec {
    TemplateNodeSpec {
        key: key.into(),
        parent: parent.map(String::from),
        kind,
        title: key.replace('-', " "),
        severity,
        check,
    }
}

pub fn builtin(code: BuiltinCheck) -> Option<CheckDescriptor> {
    Some(CheckDescriptor::Builtin { code })
}

pub fn sql_check(template: &str) -> Option<CheckDescriptor> {
    Some(CheckDescriptor::SqlTemplate(SqlTemplateCheck {
        template: template.into(),
        mapping: None,
        rule: PassFailRule::default(),
        params: Map::<String, Value>::new(),
    }))
}

/// Group `structure` with a built-in, a template, and a manual item.
pub fn baseline() -> TemplateDocument {
    TemplateDocument {
        name: "baseline".into(),
        nodes: vec![
            node("structure", None, NodeKind::Group, Severity::Info, None),
            node(
                "no-pk",
                Some("structure"),
                NodeKind::Item,
                Severity::Error,
                builtin(BuiltinCheck::NoPrimaryKey),
            ),
            node(
                "dup-emails",
                Some("structure"),
                NodeKind::Item,
                Severity::Warning,
                sql_check("SELECT email FROM {{schema}}.users GROUP BY email HAVING count(*) > 1"),
            ),
            node(
                "naming-review",
                Some("structure"),
                NodeKind::Item,
                Severity::Info,
                None,
            ),
        ],
    }
}

/// In-memory store with `doc` imported and one fresh run.
pub async fn store_with_run(doc: &TemplateDocument) -> (AuditStore, ImportedTemplate, String) {
    let store = AuditStore::new_local(":memory:").await.unwrap();
    let imported = store.import_template(doc).await.unwrap();
    let run = store.create_run(&imported.version_id).await.unwrap();
    (store, imported, run.id)
}

/// Node id of the node titled after `key`.
pub fn node_id(imported: &ImportedTemplate, key: &str) -> String {
    let title = key.replace('-', " ");
    imported
        .nodes
        .iter()
        .find(|n| n.title == title)
        .map(|n| n.id.clone())
        .unwrap_or_else(|| panic!("no node {key}"))
}
