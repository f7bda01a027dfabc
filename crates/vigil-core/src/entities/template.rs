use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::CheckDescriptor;
use crate::enums::{NodeKind, Severity};

/// A template version as loaded from a file by `vigil import`.
///
/// Nodes reference their parent by `key`, a name local to the document;
/// the store assigns real ids. Sibling order is the order in `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TemplateDocument {
    pub name: String,
    pub nodes: Vec<TemplateNodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TemplateNodeSpec {
    pub key: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub check: Option<CheckDescriptor>,
}
