use schemars::schema_for;
use vigil_core::entities::{AuditRun, CheckResult, TemplateDocument};
use vigil_core::rollup::RunRollup;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `vigil schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_for_type(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_for_type(type_name: &str) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name.replace('_', "-").as_str() {
        "template" => schema_for!(TemplateDocument),
        "check-result" => schema_for!(CheckResult),
        "run" => schema_for!(AuditRun),
        "rollup" => schema_for!(RunRollup),
        other => anyhow::bail!(
            "unknown schema type '{other}' (expected template, check-result, run, rollup)"
        ),
    };
    Ok(serde_json::to_value(schema)?)
}
