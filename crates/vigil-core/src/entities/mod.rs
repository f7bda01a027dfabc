//! Entity structs for Vigil domain objects.
//!
//! Nodes, runs, and results map to tables in the libSQL result store. All
//! structs derive `Serialize`, `Deserialize`, and `JsonSchema` so callers can
//! render issue lists or ERD annotations straight from the JSON form.

mod node;
mod result;
mod run;
mod target;
mod template;

pub use node::{CheckDescriptor, CheckNode, PassFailRule, ResultMapping, SqlTemplateCheck};
pub use result::{CheckExecution, CheckOutput, CheckResult, OutputStats};
pub use run::AuditRun;
pub use target::{RelationshipTarget, TargetRef};
pub use template::{TemplateDocument, TemplateNodeSpec};
