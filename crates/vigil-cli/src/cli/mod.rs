use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vigil` binary.
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about = "Vigil - schema audit check runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["vigil", "--format", "raw", "--verbose", "results", "run-1"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Results(args) if args.run_id == "run-1"));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vigil", "rollup", "run-1", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn run_collects_repeated_schemas_and_nodes() {
        let cli = Cli::try_parse_from([
            "vigil", "run", "--version-id", "ver-1", "--schema", "public", "--schema", "billing",
            "--node", "nod-1", "--node", "nod-2",
        ])
        .expect("cli should parse");

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.version_id.as_deref(), Some("ver-1"));
        assert_eq!(args.target.schemas, vec!["public", "billing"]);
        assert_eq!(args.nodes, vec!["nod-1", "nod-2"]);
    }

    #[test]
    fn run_needs_version_or_run() {
        assert!(Cli::try_parse_from(["vigil", "run"]).is_err());
        assert!(
            Cli::try_parse_from(["vigil", "run", "--version-id", "ver-1", "--run", "run-1"]).is_err()
        );
        assert!(Cli::try_parse_from(["vigil", "run", "--run", "run-1"]).is_ok());
    }

    #[test]
    fn preview_defaults_to_small_row_cap() {
        let cli = Cli::try_parse_from(["vigil", "preview", "--sql", "SELECT 1", "--var", "n=3"])
            .expect("cli should parse");

        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.rows, 25);
        assert_eq!(args.vars, vec!["n=3"]);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["vigil", "--format", "xml", "results", "run-1"]).is_err());
    }
}
