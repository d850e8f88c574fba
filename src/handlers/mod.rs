//! Recipe step handlers.
//!
//! A [`StepHandler`] claims one or more step names and performs the work a
//! step of that name describes. Handlers are kept in a [`HandlerRegistry`]
//! and dispatched by name.

pub mod activate_shell;
pub mod feature;
mod registry;

pub use activate_shell::ActivateShellStep;
pub use feature::{FeaturePayload, FeatureStep};
pub use registry::HandlerRegistry;

use crate::execution::ExecutionId;
use crate::recipe::RecipeStep;

/// Performs recipe steps of the names it claims.
pub trait StepHandler: Send + Sync {
    /// Step names this handler claims.
    fn names(&self) -> &[&str];

    /// Whether this handler handles steps named `name`.
    fn can_handle(&self, name: &str) -> bool {
        self.names().contains(&name)
    }

    /// Perform the step. An error fails the whole execution.
    fn execute(&self, context: &mut RecipeContext) -> anyhow::Result<()>;
}

/// A step being executed, as seen by its handler.
#[derive(Debug, Clone)]
pub struct RecipeContext {
    pub execution_id: ExecutionId,
    pub step: RecipeStep,
    executed: bool,
}

impl RecipeContext {
    pub fn new(execution_id: ExecutionId, step: RecipeStep) -> Self {
        Self {
            execution_id,
            step,
            executed: false,
        }
    }

    /// Record that a handler ran for this step.
    pub fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Whether a handler ran for this step.
    pub fn executed(&self) -> bool {
        self.executed
    }
}
