use anyhow::Context;
use serde::Serialize;
use vigil_core::entities::TemplateDocument;
use vigil_core::enums::NodeKind;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ImportResponse {
    version_id: String,
    name: String,
    nodes: usize,
    items: usize,
}

/// Handle `vigil import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read template file {}", args.path))?;
    let doc: TemplateDocument = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid template document", args.path))?;

    let imported = ctx
        .store
        .import_template(&doc)
        .await
        .with_context(|| format!("failed to import template '{}'", doc.name))?;
    tracing::info!(version_id = %imported.version_id, "template imported");

    let response = ImportResponse {
        items: imported.nodes.iter().filter(|n| n.kind == NodeKind::Item).count(),
        nodes: imported.nodes.len(),
        version_id: imported.version_id,
        name: imported.name,
    };
    output(&response, flags.format)
}
