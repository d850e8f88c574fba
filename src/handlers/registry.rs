//! Handler registry for dispatching steps by name.

use tracing::debug;

use super::{RecipeContext, StepHandler};
use crate::error::{RecipeError, Result};

/// Registered step handlers, in registration order.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn StepHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    ///
    /// Fails with [`RecipeError::HandlerConflict`] when one of its names is
    /// already claimed.
    pub fn register(&mut self, handler: Box<dyn StepHandler>) -> Result<()> {
        if let Some(name) = handler
            .names()
            .iter()
            .find(|name| self.get(name).is_some())
        {
            return Err(RecipeError::HandlerConflict {
                name: name.to_string(),
            });
        }

        self.handlers.push(handler);
        Ok(())
    }

    /// The handler claiming `name`, if any.
    pub fn get(&self, name: &str) -> Option<&dyn StepHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(name))
            .map(|h| h.as_ref())
    }

    /// Run the handler for the context's step.
    ///
    /// With no matching handler this returns `Ok(())` and leaves the context
    /// unexecuted.
    pub fn dispatch(&self, context: &mut RecipeContext) -> anyhow::Result<()> {
        let Some(handler) = self.get(&context.step.name) else {
            debug!("No handler claims step '{}'", context.step.name);
            return Ok(());
        };

        handler.execute(context)?;
        context.mark_executed();
        Ok(())
    }

    /// All claimed step names.
    pub fn names(&self) -> Vec<&str> {
        self.handlers
            .iter()
            .flat_map(|h| h.names().iter().copied())
            .collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
