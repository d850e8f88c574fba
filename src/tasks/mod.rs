//! In-memory task processing.
//!
//! The [`TaskProcessingEngine`] is a FIFO of [`TaskEntry`]s pumped by the
//! host. Each entry names an event; the [`TaskBus`] routes it to the
//! [`TaskHandler`] registered for that event. Handlers may add new tasks
//! while they run.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::tenant::{ShellDescriptor, ShellSettings};

/// A unit of deferred work.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    pub process_id: String,
    pub task_id: String,
    pub shell: ShellSettings,
    pub descriptor: ShellDescriptor,
    pub event_name: String,
    pub parameters: HashMap<String, Value>,
}

/// Receives tasks for one event name.
pub trait TaskHandler: Send + Sync {
    /// Event name this handler receives.
    fn event_name(&self) -> &str;

    /// Run the task.
    fn handle(&self, task: &TaskEntry) -> Result<()>;
}

/// Routes tasks to handlers by event name.
#[derive(Default)]
pub struct TaskBus {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler for the same event.
    pub fn register(&mut self, handler: Arc<dyn TaskHandler>) {
        self.handlers
            .insert(handler.event_name().to_string(), handler);
    }

    /// Handler registered for an event name.
    pub fn get(&self, event_name: &str) -> Option<&Arc<dyn TaskHandler>> {
        self.handlers.get(event_name)
    }
}

/// FIFO task queue shared by everything that schedules deferred work.
#[derive(Default)]
pub struct TaskProcessingEngine {
    entries: Mutex<VecDeque<TaskEntry>>,
}

impl TaskProcessingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task and return its process id.
    pub fn add_task(
        &self,
        shell: ShellSettings,
        descriptor: ShellDescriptor,
        event_name: &str,
        parameters: HashMap<String, Value>,
    ) -> String {
        let entry = TaskEntry {
            process_id: Uuid::new_v4().simple().to_string(),
            task_id: Uuid::new_v4().simple().to_string(),
            shell,
            descriptor,
            event_name: event_name.to_string(),
            parameters,
        };
        let process_id = entry.process_id.clone();

        debug!("Adding task '{}' ({})", event_name, process_id);
        self.lock().push_back(entry);
        process_id
    }

    /// Whether any task is queued.
    pub fn are_tasks_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Number of queued tasks.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Run the oldest task. Returns `false` if none was queued.
    ///
    /// The queue lock is released before the handler runs.
    pub fn execute_next_task(&self, bus: &TaskBus) -> Result<bool> {
        let Some(entry) = self.lock().pop_front() else {
            return Ok(false);
        };

        match bus.get(&entry.event_name) {
            Some(handler) => {
                debug!("Executing task '{}' ({})", entry.event_name, entry.process_id);
                handler.handle(&entry)?;
            }
            None => {
                warn!(
                    "No task handler for event '{}'; dropping task {}",
                    entry.event_name, entry.process_id
                );
            }
        }
        Ok(true)
    }

    /// Run tasks until none are pending, returning how many ran.
    ///
    /// Stops at the first failing task; tasks queued behind it stay queued.
    pub fn pump(&self, bus: &TaskBus) -> Result<usize> {
        let mut executed = 0;
        while self.execute_next_task(bus)? {
            executed += 1;
        }
        Ok(executed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TaskEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for TaskProcessingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskProcessingEngine")
            .field("pending", &self.pending_count())
            .finish()
    }
}
