//! Entry points for running recipes.

use std::sync::Arc;

use tracing::{debug, info};

use super::scheduler::RecipeScheduler;
use super::ExecutionId;
use crate::error::Result;
use crate::ledger::StepResultLedger;
use crate::queue::StepQueue;
use crate::recipe::Recipe;
use crate::tenant::{EventBus, ShellDescriptorManager};

/// Enqueues a recipe's steps and schedules their execution.
pub struct RecipeManager {
    queue: Arc<dyn StepQueue>,
    ledger: Arc<StepResultLedger>,
    scheduler: Arc<RecipeScheduler>,
    events: Arc<EventBus>,
}

impl RecipeManager {
    pub fn new(
        queue: Arc<dyn StepQueue>,
        ledger: Arc<StepResultLedger>,
        scheduler: Arc<RecipeScheduler>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            queue,
            ledger,
            scheduler,
            events,
        }
    }

    /// Start executing a recipe.
    ///
    /// Returns as soon as the first task is scheduled; the steps run when the
    /// task engine is pumped. A recipe without steps is ignored and yields
    /// `None`.
    pub fn execute(&self, recipe: &Recipe) -> Result<Option<ExecutionId>> {
        if recipe.is_empty() {
            info!("Recipe '{}' has no steps; nothing to execute", recipe.name());
            return Ok(None);
        }

        let execution_id = ExecutionId::new();
        info!(
            "Starting recipe '{}' ({} step(s)) as execution {}",
            recipe.name(),
            recipe.steps.len(),
            execution_id
        );
        self.events.execution_start(&execution_id, recipe);

        for step in &recipe.steps {
            self.queue.enqueue(&execution_id, step)?;
            self.ledger
                .record(&execution_id, &step.recipe_name, &step.id, &step.name)?;
        }

        self.scheduler.schedule_work(&execution_id)?;
        Ok(Some(execution_id))
    }
}

/// Runs a recipe and marks the tenant's shell descriptor as changed.
pub struct RecipeExecutor {
    manager: Arc<RecipeManager>,
    descriptors: Arc<ShellDescriptorManager>,
}

impl RecipeExecutor {
    pub fn new(manager: Arc<RecipeManager>, descriptors: Arc<ShellDescriptorManager>) -> Self {
        Self {
            manager,
            descriptors,
        }
    }

    /// Execute a recipe through the manager.
    ///
    /// When work was scheduled the current descriptor is written back
    /// unchanged, advancing its serial number. A tenant without a
    /// descriptor has not been set up and keeps having none.
    pub fn execute(&self, recipe: &Recipe) -> Result<Option<ExecutionId>> {
        let execution_id = self.manager.execute(recipe)?;

        if execution_id.is_some() {
            match self.descriptors.get_shell_descriptor()? {
                Some(current) => {
                    self.descriptors.update_shell_descriptor(
                        current.serial_number,
                        current.features,
                        current.parameters,
                    )?;
                }
                None => debug!(
                    "Tenant '{}' has no shell descriptor; serial left unset",
                    self.descriptors.tenant()
                ),
            }
        }

        Ok(execution_id)
    }
}
