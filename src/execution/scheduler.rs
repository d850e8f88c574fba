//! Runs executions one step per task cycle.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::executor::RecipeStepExecutor;
use super::ExecutionId;
use crate::error::{RecipeError, Result};
use crate::tasks::{TaskEntry, TaskHandler, TaskProcessingEngine};
use crate::tenant::settings::{self, SharedShellSettings};
use crate::tenant::{EventBus, ShellDescriptorManager};

/// Event name of the task that executes the next step of an execution.
pub const EXECUTE_WORK_EVENT: &str = "RecipeScheduler.ExecuteWork";

/// Task parameter carrying the execution id.
pub const EXECUTION_ID_PARAM: &str = "executionId";

/// Schedules step execution on the [`TaskProcessingEngine`].
///
/// Each `ExecuteWork` task runs exactly one step and, if more remain,
/// schedules the next task. When the queue is exhausted the tenant's shell
/// is flagged as changed.
pub struct RecipeScheduler {
    engine: Arc<TaskProcessingEngine>,
    settings: SharedShellSettings,
    descriptors: Arc<ShellDescriptorManager>,
    executor: Arc<RecipeStepExecutor>,
    events: Arc<EventBus>,
}

impl RecipeScheduler {
    pub fn new(
        engine: Arc<TaskProcessingEngine>,
        settings: SharedShellSettings,
        descriptors: Arc<ShellDescriptorManager>,
        executor: Arc<RecipeStepExecutor>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            engine,
            settings,
            descriptors,
            executor,
            events,
        }
    }

    /// Add an `ExecuteWork` task for the execution and return its process id.
    pub fn schedule_work(&self, execution_id: &ExecutionId) -> Result<String> {
        let shell = settings::snapshot(&self.settings);
        let descriptor = self.descriptors.get_shell_descriptor()?.unwrap_or_default();
        let parameters = HashMap::from([(
            EXECUTION_ID_PARAM.to_string(),
            Value::String(execution_id.to_string()),
        )]);

        let process_id = self
            .engine
            .add_task(shell, descriptor, EXECUTE_WORK_EVENT, parameters);
        debug!(
            "Scheduled work for execution {} as process {}",
            execution_id, process_id
        );
        Ok(process_id)
    }

    /// Execute the next step and reschedule, or announce completion.
    pub fn execute_work(&self, execution_id: &ExecutionId) -> Result<()> {
        if self.executor.execute_next_step(execution_id)? {
            self.schedule_work(execution_id)?;
            return Ok(());
        }

        let tenant = settings::snapshot(&self.settings).name;
        let descriptor = self.descriptors.get_shell_descriptor()?.unwrap_or_default();
        info!(
            "Recipe execution {} finished; tenant '{}' shell changed",
            execution_id, tenant
        );
        self.events.shell_descriptor_changed(&descriptor, &tenant);
        Ok(())
    }
}

impl TaskHandler for RecipeScheduler {
    fn event_name(&self) -> &str {
        EXECUTE_WORK_EVENT
    }

    fn handle(&self, task: &TaskEntry) -> Result<()> {
        let value = task
            .parameters
            .get(EXECUTION_ID_PARAM)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RecipeError::Other(anyhow::anyhow!(
                    "Task {} is missing the '{}' parameter",
                    task.task_id,
                    EXECUTION_ID_PARAM
                ))
            })?;

        self.execute_work(&ExecutionId::parse(value)?)
    }
}

impl std::fmt::Debug for RecipeScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeScheduler")
            .field("engine", &self.engine)
            .finish()
    }
}
