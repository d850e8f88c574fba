//! Step result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::execution::ExecutionId;

/// Completion state of one step of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResultRecord {
    pub execution_id: ExecutionId,
    pub recipe_name: String,
    pub step_id: String,
    pub step_name: String,
    pub is_completed: bool,
    pub is_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StepResultRecord {
    /// A new pending row.
    pub fn pending(
        execution_id: &ExecutionId,
        recipe_name: &str,
        step_id: &str,
        step_name: &str,
    ) -> Self {
        Self {
            execution_id: execution_id.clone(),
            recipe_name: recipe_name.to_string(),
            step_id: step_id.to_string(),
            step_name: step_name.to_string(),
            is_completed: false,
            is_successful: false,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark the row completed with the given outcome.
    pub fn complete(&mut self, outcome: &StepOutcome) {
        self.is_completed = true;
        self.completed_at = Some(Utc::now());
        match outcome {
            StepOutcome::Succeeded => {
                self.is_successful = true;
                self.error_message = None;
            }
            StepOutcome::Failed(message) => {
                self.is_successful = false;
                self.error_message = Some(message.clone());
            }
        }
    }

    /// Whether the row is still waiting for its step.
    pub fn is_pending(&self) -> bool {
        !self.is_completed
    }
}

/// How a dispatched step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
}
