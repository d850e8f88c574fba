//! Fire-and-observe notifications.
//!
//! Observers subscribe to an [`EventBus`]. A failing observer is logged and
//! never interrupts the engine.

use std::sync::{Arc, RwLock};

use tracing::warn;

use super::descriptor::ShellDescriptor;
use crate::execution::ExecutionId;
use crate::handlers::RecipeContext;
use crate::recipe::Recipe;

/// Observes recipe execution progress.
pub trait RecipeEventHandler: Send + Sync {
    /// A recipe was accepted and its steps are about to be enqueued.
    fn execution_start(&self, _execution_id: &ExecutionId, _recipe: &Recipe) -> anyhow::Result<()> {
        Ok(())
    }

    /// A step is about to be dispatched.
    fn step_executing(&self, _context: &RecipeContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// A step finished successfully.
    fn step_executed(&self, _context: &RecipeContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// The execution has no more queued steps.
    fn execution_complete(&self, _execution_id: &ExecutionId) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Observes tenant shell changes.
pub trait ShellEventHandler: Send + Sync {
    /// The tenant's descriptor changed and its shell should be reloaded.
    fn shell_descriptor_changed(
        &self,
        descriptor: &ShellDescriptor,
        tenant: &str,
    ) -> anyhow::Result<()>;
}

/// Dispatches notifications to subscribed observers.
#[derive(Default)]
pub struct EventBus {
    recipe_handlers: RwLock<Vec<Arc<dyn RecipeEventHandler>>>,
    shell_handlers: RwLock<Vec<Arc<dyn ShellEventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to recipe execution events.
    pub fn subscribe_recipe(&self, handler: Arc<dyn RecipeEventHandler>) {
        self.recipe_handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(handler);
    }

    /// Subscribe to shell events.
    pub fn subscribe_shell(&self, handler: Arc<dyn ShellEventHandler>) {
        self.shell_handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(handler);
    }

    pub fn execution_start(&self, execution_id: &ExecutionId, recipe: &Recipe) {
        self.each_recipe_handler("execution_start", |h| {
            h.execution_start(execution_id, recipe)
        });
    }

    pub fn step_executing(&self, context: &RecipeContext) {
        self.each_recipe_handler("step_executing", |h| h.step_executing(context));
    }

    pub fn step_executed(&self, context: &RecipeContext) {
        self.each_recipe_handler("step_executed", |h| h.step_executed(context));
    }

    pub fn execution_complete(&self, execution_id: &ExecutionId) {
        self.each_recipe_handler("execution_complete", |h| {
            h.execution_complete(execution_id)
        });
    }

    pub fn shell_descriptor_changed(&self, descriptor: &ShellDescriptor, tenant: &str) {
        let handlers = self
            .shell_handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for handler in handlers {
            if let Err(e) = handler.shell_descriptor_changed(descriptor, tenant) {
                warn!("Shell event handler failed on shell_descriptor_changed: {:#}", e);
            }
        }
    }

    fn each_recipe_handler(
        &self,
        event: &str,
        call: impl Fn(&dyn RecipeEventHandler) -> anyhow::Result<()>,
    ) {
        // Snapshot so observers may subscribe while being notified.
        let handlers = self
            .recipe_handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for handler in handlers {
            if let Err(e) = call(handler.as_ref()) {
                warn!("Recipe event handler failed on {}: {:#}", event, e);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let recipe = self.recipe_handlers.read().map(|h| h.len()).unwrap_or(0);
        let shell = self.shell_handlers.read().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("EventBus")
            .field("recipe_handlers", &recipe)
            .field("shell_handlers", &shell)
            .finish()
    }
}
