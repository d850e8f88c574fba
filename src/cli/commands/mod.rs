//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by the
//! [`CommandDispatcher`]. Commands open their own [`crate::host::RecipeHost`]
//! through a [`Workspace`].

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod export;
pub mod list;
pub mod resume;
pub mod run;
pub mod setup;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, Workspace};
