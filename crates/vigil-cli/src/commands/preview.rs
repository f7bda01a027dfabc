use anyhow::Context;
use vigil_engine::template::run_variables;
use vigil_engine::{PgTargetProvider, QueryLimits, TargetDatabase, TargetProvider, preview_sql};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PreviewArgs;
use crate::commands::shared::parse::parse_var;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil preview`.
pub async fn handle(args: &PreviewArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    anyhow::ensure!(args.rows > 0, "--rows must be greater than zero");

    let info = ctx.target_conn_info(&args.target)?;
    let mut vars = run_variables(&ctx.schemas(&args.target));
    for raw in &args.vars {
        let (name, value) = parse_var(raw)?;
        vars.insert(name, value);
    }
    let limits = QueryLimits::from_config(&ctx.config.engine).with_row_cap(args.rows);

    let mut target = PgTargetProvider.connect(&info).await?;
    let preview = preview_sql(&mut target, &args.sql, &vars, limits).await;
    target.release().await;

    let preview = preview.context("preview failed")?;
    output(&preview, flags.format)
}
