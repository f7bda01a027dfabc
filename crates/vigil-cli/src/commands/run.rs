use anyhow::Context;
use vigil_engine::{Dispatcher, NodeSelection, PgTargetProvider, RunRequest};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vigil run`.
pub async fn handle(args: &RunArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let target = ctx.target_conn_info(&args.target)?;

    let run_id = match (&args.run, &args.version_id) {
        (Some(run_id), _) => run_id.clone(),
        (None, Some(version_id)) => {
            let run = ctx
                .store
                .create_run(version_id)
                .await
                .with_context(|| format!("failed to create run for version {version_id}"))?;
            tracing::info!(run_id = %run.id, "run created");
            run.id
        }
        (None, None) => anyhow::bail!("pass --version-id or --run"),
    };

    let selection = if args.nodes.is_empty() {
        NodeSelection::All
    } else {
        NodeSelection::Items(args.nodes.clone())
    };

    let dispatcher = Dispatcher::new(&ctx.store, PgTargetProvider, ctx.config.engine.clone());
    let summary = dispatcher
        .run_checks(RunRequest {
            run_id,
            target,
            schemas: ctx.schemas(&args.target),
            selection,
        })
        .await?;
    output(&summary, flags.format)
}
