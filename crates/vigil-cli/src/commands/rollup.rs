use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunIdArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil rollup`.
pub async fn handle(args: &RunIdArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let run = ctx
        .store
        .get_run(&args.run_id)
        .await
        .with_context(|| format!("run {} not found", args.run_id))?;
    output(&run, flags.format)
}
