use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunIdArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil results`.
pub async fn handle(args: &RunIdArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    // Fails on unknown runs instead of printing an empty list.
    ctx.store
        .get_run(&args.run_id)
        .await
        .with_context(|| format!("run {} not found", args.run_id))?;
    let results = ctx.store.list_results(&args.run_id).await?;
    output(&results, flags.format)
}
