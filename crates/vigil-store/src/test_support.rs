//! Shared fixtures for vigil-store unit tests.

use vigil_core::entities::{
    CheckDescriptor, PassFailRule, SqlTemplateCheck, TemplateDocument, TemplateNodeSpec,
};
use vigil_core::enums::{BuiltinCheck, NodeKind, Severity};

use crate::AuditStore;

pub async fn test_store() -> AuditStore {
    AuditStore::new_local(":memory:").await.unwrap()
}

fn spec(
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

/// One group holding a built-in item, a template item, and a manual item.
pub fn baseline_template() -> TemplateDocument {
    TemplateDocument {
        name: "baseline".into(),
        nodes: vec![
            spec("structure", None, NodeKind::Group, Severity::Info, None),
            spec(
                "no-pk",
                Some("structure"),
                NodeKind::Item,
                Severity::Error,
                Some(CheckDescriptor::Builtin {
                    code: BuiltinCheck::NoPrimaryKey,
                }),
            ),
            spec(
                "dup-emails",
                Some("structure"),
                NodeKind::Item,
                Severity::Warning,
                Some(CheckDescriptor::SqlTemplate(SqlTemplateCheck {
                    template: "SELECT email FROM {{schema}}.users GROUP BY email HAVING count(*) > 1"
                        .into(),
                    mapping: None,
                    rule: PassFailRule::default(),
                    params: serde_json::Map::new(),
                })),
            ),
            spec(
                "naming-review",
                Some("structure"),
                NodeKind::Item,
                Severity::Info,
                None,
            ),
        ],
    }
}
