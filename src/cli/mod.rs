//! Command-line interface for Orchard recipes.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, ExportArgs, ListArgs, ResumeArgs, RunArgs, SetupArgs,
    StatusArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult, Workspace};
