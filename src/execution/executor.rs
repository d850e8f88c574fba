//! Executes one queued step at a time.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::ExecutionId;
use crate::error::{RecipeError, Result};
use crate::handlers::{HandlerRegistry, RecipeContext};
use crate::ledger::{StepOutcome, StepResultLedger};
use crate::queue::StepQueue;
use crate::recipe::RecipeStep;
use crate::tenant::EventBus;

/// Dequeues a step, dispatches it and records the outcome.
pub struct RecipeStepExecutor {
    queue: Arc<dyn StepQueue>,
    handlers: Arc<HandlerRegistry>,
    ledger: Arc<StepResultLedger>,
    events: Arc<EventBus>,
}

impl RecipeStepExecutor {
    pub fn new(
        queue: Arc<dyn StepQueue>,
        handlers: Arc<HandlerRegistry>,
        ledger: Arc<StepResultLedger>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            queue,
            handlers,
            ledger,
            events,
        }
    }

    /// Execute the next queued step of an execution.
    ///
    /// Returns `Ok(true)` after a step succeeded and `Ok(false)` once the
    /// queue is empty. Any failure discards the rest of the queue.
    pub fn execute_next_step(&self, execution_id: &ExecutionId) -> Result<bool> {
        let step = match self.queue.dequeue(execution_id) {
            Ok(Some(step)) => step,
            Ok(None) => {
                info!("Recipe execution {} has no more steps", execution_id);
                self.events.execution_complete(execution_id);
                return Ok(false);
            }
            Err(e) => {
                error!("Could not dequeue next step of execution {}: {}", execution_id, e);
                self.discard_remaining(execution_id);
                return Err(e);
            }
        };

        info!(
            "Executing recipe step '{}' ({}) of execution {}",
            step.name, step.id, execution_id
        );

        let mut context = RecipeContext::new(execution_id.clone(), step);
        self.events.step_executing(&context);

        if let Err(e) = self.handlers.dispatch(&mut context) {
            let message = format!("{:#}", e);
            error!(
                "Recipe step '{}' of execution {} failed: {}",
                context.step.name, execution_id, message
            );
            self.record_outcome(&context.step, execution_id, StepOutcome::Failed(message.clone()));
            self.discard_remaining(execution_id);
            return Err(RecipeError::StepFailed {
                execution_id: execution_id.to_string(),
                step: context.step.name,
                message,
            });
        }

        if !context.executed() {
            error!(
                "No handler for recipe step '{}' of execution {}",
                context.step.name, execution_id
            );
            self.discard_remaining(execution_id);
            return Err(RecipeError::UnhandledStep {
                execution_id: execution_id.to_string(),
                step: context.step.name,
            });
        }

        if let Err(e) = self.ledger.complete(
            execution_id,
            Some(context.step.recipe_name.as_str()),
            &context.step.id,
            &context.step.name,
            StepOutcome::Succeeded,
        ) {
            error!(
                "Could not record result of step '{}' of execution {}: {}",
                context.step.name, execution_id, e
            );
            self.discard_remaining(execution_id);
            return Err(e.into());
        }
        self.events.step_executed(&context);

        info!(
            "Finished recipe step '{}' ({}) of execution {}",
            context.step.name, context.step.id, execution_id
        );
        Ok(true)
    }

    fn record_outcome(&self, step: &RecipeStep, execution_id: &ExecutionId, outcome: StepOutcome) {
        if let Err(e) = self.ledger.complete(
            execution_id,
            Some(step.recipe_name.as_str()),
            &step.id,
            &step.name,
            outcome,
        ) {
            warn!("Could not record result of step '{}': {:#}", step.name, e);
        }
    }

    fn discard_remaining(&self, execution_id: &ExecutionId) {
        match self.queue.drain(execution_id) {
            Ok(0) => {}
            Ok(discarded) => warn!(
                "Discarded {} remaining step(s) of execution {}",
                discarded, execution_id
            ),
            Err(e) => warn!("Could not drain execution {}: {}", execution_id, e),
        }
    }
}
