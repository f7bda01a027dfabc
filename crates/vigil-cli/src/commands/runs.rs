use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunsArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil runs`.
pub async fn handle(args: &RunsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let runs = ctx.store.list_runs(&args.version_id).await?;
    output(&runs, flags.format)
}
