//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Orchard - run recipes against a tenant.
#[derive(Debug, Parser)]
#[command(name = "orchard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .orchard/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute a recipe
    Run(RunArgs),

    /// Show execution results
    Status(StatusArgs),

    /// List recipes found in the recipe directories
    List(ListArgs),

    /// Set up the tenant with a setup recipe
    Setup(SetupArgs),

    /// Export the tenant as a recipe
    Export(ExportArgs),

    /// Continue executions whose steps are still queued
    Resume(ResumeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Recipe name or path to a recipe file
    pub recipe: String,

    /// Queue the steps without executing them
    #[arg(long)]
    pub no_execute: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Execution to show (all executions when omitted)
    pub execution_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// List only setup recipes
    #[arg(long)]
    pub setup: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `setup` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SetupArgs {
    /// Setup recipe name or path (the first setup recipe when omitted)
    pub recipe: Option<String>,

    /// Features of the initial shell descriptor (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,
}

/// Arguments for the `export` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExportArgs {
    /// Name of the exported recipe (defaults to the tenant name)
    #[arg(long)]
    pub name: Option<String>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `resume` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResumeArgs {
    /// Execution to resume (all interrupted executions when omitted)
    pub execution_id: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_globals() {
        let cli = Cli::parse_from(["orchard", "--project", "/tmp/site", "run", "blog", "--json"]);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/site")));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.recipe, "blog");
                assert!(args.json);
                assert!(!args.no_execute);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_setup_features_list() {
        let cli = Cli::parse_from(["orchard", "setup", "--features", "A,B"]);
        match cli.command {
            Commands::Setup(args) => {
                assert!(args.recipe.is_none());
                assert_eq!(args.features, vec!["A", "B"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn run_requires_recipe() {
        assert!(Cli::try_parse_from(["orchard", "run"]).is_err());
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["orchard"]).is_err());
    }
}
