//! Recipe execution.
//!
//! [`RecipeManager`] enqueues a recipe's steps and schedules one
//! `ExecuteWork` task. Each task run by the [`TaskProcessingEngine`] lets
//! [`RecipeScheduler`] execute exactly one step through
//! [`RecipeStepExecutor`] and schedule the next task until the queue is
//! empty.
//!
//! [`TaskProcessingEngine`]: crate::tasks::TaskProcessingEngine

mod executor;
mod id;
mod manager;
mod scheduler;

pub use executor::RecipeStepExecutor;
pub use id::ExecutionId;
pub use manager::{RecipeExecutor, RecipeManager};
pub use scheduler::{RecipeScheduler, EXECUTE_WORK_EVENT, EXECUTION_ID_PARAM};
