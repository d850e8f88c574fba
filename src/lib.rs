//! Orchard recipes - durable recipe execution for tenant provisioning.
//!
//! A recipe is an ordered list of named steps. Executing a recipe enqueues
//! every step in a file-backed queue, records a pending row per step in a
//! result ledger and schedules work on a task engine that runs one step per
//! cycle. Step failures stop the execution and discard its remaining steps.
//!
//! # Modules
//!
//! - [`recipe`] - Recipe model, parser, harvester and export builder
//! - [`queue`] - Durable per-execution step queue
//! - [`ledger`] - Step result ledger and result accessor
//! - [`handlers`] - Step handler trait, registry and built-in handlers
//! - [`execution`] - Step executor, scheduler and recipe manager
//! - [`tasks`] - In-memory task processing engine
//! - [`tenant`] - Shell settings, shell descriptor and event bus
//! - [`setup`] - Tenant setup flow
//! - [`host`] - Wiring of all components for one tenant
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use orchard_recipes::recipe::{RecipeFormat, RecipeParser};
//!
//! let recipe = RecipeParser::parse(
//!     r#"{"recipe": {"name": "Blog"}, "Feature": {"enable": ["Orchard.Blogs"]}}"#,
//!     RecipeFormat::Json,
//!     "blog.recipe.json",
//! )
//! .unwrap();
//! assert_eq!(recipe.name(), "Blog");
//! assert_eq!(recipe.steps[0].id, "1");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod handlers;
pub mod host;
pub mod ledger;
pub mod queue;
pub mod recipe;
pub mod setup;
pub mod tasks;
pub mod tenant;
pub mod ui;

pub use error::{RecipeError, Result};
