//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::load_config;
use crate::error::Result;
use crate::host::RecipeHost;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command and report its exit status.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command finds its project and configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub project_root: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            config_path: None,
        }
    }

    /// Use exactly this configuration file.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Load the configuration and wire a [`RecipeHost`].
    pub fn open_host(&self) -> Result<RecipeHost> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        RecipeHost::open(&self.project_root, &config)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    workspace: Workspace,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            workspace: Workspace::new(project_root),
        }
    }

    /// Load configuration from this file instead of `.orchard/`.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.workspace = self.workspace.with_config(path);
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.workspace.project_root
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let workspace = self.workspace.clone();
        match &cli.command {
            Commands::Run(args) => super::run::RunCommand::new(workspace, args.clone()).execute(ui),
            Commands::Status(args) => {
                super::status::StatusCommand::new(workspace, args.clone()).execute(ui)
            }
            Commands::List(args) => {
                super::list::ListCommand::new(workspace, args.clone()).execute(ui)
            }
            Commands::Setup(args) => {
                super::setup::SetupCommand::new(workspace, args.clone()).execute(ui)
            }
            Commands::Export(args) => {
                super::export::ExportCommand::new(workspace, args.clone()).execute(ui)
            }
            Commands::Resume(args) => {
                super::resume::ResumeCommand::new(workspace, args.clone()).execute(ui)
            }
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
