use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Import a check template from a JSON file.
    Import(ImportArgs),
    /// Execute the automatic checks of a run.
    Run(RunArgs),
    /// List runs of a template version.
    Runs(RunsArgs),
    /// List the results of a run.
    Results(RunIdArgs),
    /// Show a run with its rollup.
    Rollup(RunIdArgs),
    /// Run candidate template SQL against the target under the check guardrails.
    Preview(PreviewArgs),
    /// Dump the target catalog snapshot used by built-in checks.
    Catalog(TargetArgs),
    /// Dump JSON schema for an exported type.
    Schema(SchemaArgs),
}

/// Connection overrides shared by commands that reach the target.
#[derive(Clone, Debug, Default, Args)]
pub struct TargetArgs {
    /// Target database URL (defaults to `target.database_url`).
    #[arg(long)]
    pub target_url: Option<String>,
    /// Schema to audit; repeat for several (defaults to `target.schemas`).
    #[arg(long = "schema")]
    pub schemas: Vec<String>,
}

/// Arguments for `vigil import`.
#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Path to a template document (JSON).
    pub path: String,
}

/// Arguments for `vigil run`.
#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Create a new run for this template version.
    #[arg(long = "version-id", conflicts_with = "run", required_unless_present = "run")]
    pub version_id: Option<String>,
    /// Re-execute an existing run.
    #[arg(long = "run")]
    pub run: Option<String>,
    /// Only execute these item nodes; repeat for several.
    #[arg(long = "node")]
    pub nodes: Vec<String>,
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for `vigil runs`.
#[derive(Clone, Debug, Args)]
pub struct RunsArgs {
    pub version_id: String,
}

/// Arguments for commands addressing a single run.
#[derive(Clone, Debug, Args)]
pub struct RunIdArgs {
    pub run_id: String,
}

/// Arguments for `vigil preview`.
#[derive(Clone, Debug, Args)]
pub struct PreviewArgs {
    /// Template SQL; `{{schema}}`, `{{schemas}}` and `--var` names are available.
    #[arg(long)]
    pub sql: String,
    /// Extra template variable as `name=value`; values that parse as JSON are kept typed.
    #[arg(long = "var")]
    pub vars: Vec<String>,
    /// Maximum rows to return.
    #[arg(long, default_value_t = 25)]
    pub rows: usize,
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for `vigil schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// One of: template, check-result, run, rollup.
    pub type_name: String,
}
