use anyhow::Context;
use vigil_engine::{PgTargetProvider, TargetDatabase, TargetProvider};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TargetArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil catalog`.
pub async fn handle(args: &TargetArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let info = ctx.target_conn_info(args)?;
    let schemas = ctx.schemas(args);

    let mut target = PgTargetProvider.connect(&info).await?;
    let snapshot = target
        .catalog(&schemas, ctx.config.engine.statement_timeout())
        .await;
    target.release().await;

    let snapshot = snapshot.context("failed to load catalog snapshot")?;
    output(&snapshot, flags.format)
}
