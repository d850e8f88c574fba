//! Durable per-execution step queues.
//!
//! Every execution owns one FIFO of pending [`RecipeStep`]s. Steps are
//! enqueued when a recipe is scheduled and dequeued one at a time by the
//! executor. On failure the remainder of the queue is drained and discarded.

mod folder;

pub use folder::FolderStepQueue;

use tracing::warn;

use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;
use crate::recipe::RecipeStep;

/// A durable FIFO of steps, namespaced by execution.
pub trait StepQueue: Send + Sync {
    /// Append a step after every step already queued for the execution.
    fn enqueue(&self, execution_id: &ExecutionId, step: &RecipeStep) -> Result<()>;

    /// Remove and return the oldest step, or `None` when nothing is queued.
    fn dequeue(&self, execution_id: &ExecutionId) -> Result<Option<RecipeStep>>;

    /// Number of steps still queued.
    fn pending(&self, execution_id: &ExecutionId) -> Result<usize>;

    /// Discard every remaining step, returning how many were removed.
    ///
    /// Unreadable records count as discarded.
    fn drain(&self, execution_id: &ExecutionId) -> Result<usize> {
        let mut discarded = 0;
        loop {
            match self.dequeue(execution_id) {
                Ok(Some(_)) => discarded += 1,
                Ok(None) => break,
                Err(RecipeError::QueueRecord { path, message }) => {
                    warn!("Discarding unreadable queue record {}: {}", path.display(), message);
                    discarded += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(discarded)
    }
}
