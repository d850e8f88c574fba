//! Read-only view of execution progress.

use std::sync::Arc;

use serde::Serialize;

use super::store::StepResultLedger;
use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;

/// Progress of every step of one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResult {
    pub execution_id: ExecutionId,
    pub steps: Vec<RecipeStepResult>,
}

impl RecipeResult {
    /// Every step has completed.
    pub fn is_completed(&self) -> bool {
        self.steps.iter().all(|s| s.is_completed)
    }

    /// Every step has completed successfully.
    pub fn is_successful(&self) -> bool {
        self.steps.iter().all(|s| s.is_completed && s.is_successful)
    }

    /// The first failed step, if any.
    pub fn failure(&self) -> Option<&RecipeStepResult> {
        self.steps
            .iter()
            .find(|s| s.is_completed && !s.is_successful)
    }
}

/// Progress of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStepResult {
    pub recipe_name: String,
    pub step_name: String,
    pub is_completed: bool,
    pub is_successful: bool,
    pub error_message: Option<String>,
}

/// Projects ledger rows into [`RecipeResult`]s.
#[derive(Debug, Clone)]
pub struct RecipeResultAccessor {
    ledger: Arc<StepResultLedger>,
}

impl RecipeResultAccessor {
    pub fn new(ledger: Arc<StepResultLedger>) -> Self {
        Self { ledger }
    }

    /// Current progress of an execution.
    ///
    /// Fails with [`RecipeError::NoRecipeResults`] when the ledger has no
    /// rows for the id.
    pub fn get_result(&self, execution_id: &ExecutionId) -> Result<RecipeResult> {
        let rows = self.ledger.query(execution_id)?;
        if rows.is_empty() {
            return Err(RecipeError::NoRecipeResults {
                execution_id: execution_id.to_string(),
            });
        }

        let steps = rows
            .into_iter()
            .map(|row| RecipeStepResult {
                recipe_name: row.recipe_name,
                step_name: row.step_name,
                is_completed: row.is_completed,
                is_successful: row.is_successful,
                error_message: row.error_message,
            })
            .collect();

        Ok(RecipeResult {
            execution_id: execution_id.clone(),
            steps,
        })
    }
}
