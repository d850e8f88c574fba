//! Folder-backed step queue.
//!
//! Layout: `<root>/<execution_id>/<n>`, one JSON record per file, where `n`
//! is the arrival sequence number starting at 0.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use tracing::debug;

use super::StepQueue;
use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;
use crate::recipe::RecipeStep;

/// Name of the queue folder below the application data directory.
pub const QUEUE_DIR: &str = "RecipeQueue";

/// A [`StepQueue`] storing each step as a numbered file.
pub struct FolderStepQueue {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FolderStepQueue {
    /// Create a queue under `<app_data>/RecipeQueue`.
    pub fn new(app_data: impl AsRef<Path>) -> Self {
        Self::with_root(app_data.as_ref().join(QUEUE_DIR))
    }

    /// Create a queue rooted directly at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    /// Queue root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Execution ids that still have a queue folder.
    pub fn executions(&self) -> Result<Vec<ExecutionId>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| ExecutionId::parse(name).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn execution_dir(&self, execution_id: &ExecutionId) -> PathBuf {
        self.root.join(execution_id.as_str())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Sequence numbers present in an execution folder, ignoring stray files.
fn sequence_numbers(dir: &Path) -> Result<Vec<u64>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut numbers = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(n) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u64>().ok())
        {
            numbers.push(n);
        }
    }
    Ok(numbers)
}

impl StepQueue for FolderStepQueue {
    fn enqueue(&self, execution_id: &ExecutionId, step: &RecipeStep) -> Result<()> {
        let _guard = self.guard();
        let dir = self.execution_dir(execution_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create queue folder {:?}", dir))?;

        let next = sequence_numbers(&dir)?
            .into_iter()
            .max()
            .map_or(0, |max| max + 1);

        let record = serde_json::to_vec(step).context("Failed to serialize recipe step")?;

        let target = dir.join(next.to_string());
        let temp = dir.join(format!(".{}.tmp", next));
        fs::write(&temp, &record).with_context(|| format!("Failed to write {:?}", temp))?;

        // Hard-linking fails if the target already exists.
        let linked = fs::hard_link(&temp, &target);
        let _ = fs::remove_file(&temp);
        linked.with_context(|| format!("Queue record {:?} already exists", target))?;

        debug!(
            "Enqueued step '{}' ({}) for execution {} at position {}",
            step.name, step.id, execution_id, next
        );
        Ok(())
    }

    fn dequeue(&self, execution_id: &ExecutionId) -> Result<Option<RecipeStep>> {
        let _guard = self.guard();
        let dir = self.execution_dir(execution_id);

        let Some(first) = sequence_numbers(&dir)?.into_iter().min() else {
            if dir.is_dir() {
                let _ = fs::remove_dir(&dir);
            }
            return Ok(None);
        };

        let path = dir.join(first.to_string());
        let content =
            fs::read(&path).with_context(|| format!("Failed to read queue record {:?}", path))?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove queue record {:?}", path))?;

        if sequence_numbers(&dir)?.is_empty() {
            let _ = fs::remove_dir(&dir);
        }

        let step: RecipeStep =
            serde_json::from_slice(&content).map_err(|e| RecipeError::QueueRecord {
                path: path.clone(),
                message: e.to_string(),
            })?;

        debug!(
            "Dequeued step '{}' ({}) for execution {}",
            step.name, step.id, execution_id
        );
        Ok(Some(step))
    }

    fn pending(&self, execution_id: &ExecutionId) -> Result<usize> {
        let _guard = self.guard();
        Ok(sequence_numbers(&self.execution_dir(execution_id))?.len())
    }
}

impl std::fmt::Debug for FolderStepQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderStepQueue")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn step(id: &str, name: &str) -> RecipeStep {
        RecipeStep::new(id, "Default", name, json!({ "id": id }))
    }

    fn queue(temp: &TempDir) -> FolderStepQueue {
        FolderStepQueue::new(temp.path())
    }

    #[test]
    fn dequeue_returns_steps_in_arrival_order() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "S1")).unwrap();
        queue.enqueue(&id, &step("2", "S2")).unwrap();
        queue.enqueue(&id, &step("3", "S3")).unwrap();

        let names: Vec<_> = (0..3)
            .map(|_| queue.dequeue(&id).unwrap().unwrap().name)
            .collect();
        assert_eq!(names, vec!["S1", "S2", "S3"]);
        assert!(queue.dequeue(&id).unwrap().is_none());
    }

    #[test]
    fn records_are_numbered_from_zero() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "Feature")).unwrap();
        queue.enqueue(&id, &step("2", "Content")).unwrap();

        let dir = temp.path().join(QUEUE_DIR).join(id.as_str());
        assert!(dir.join("0").is_file());
        assert!(dir.join("1").is_file());

        let record: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join("0")).unwrap()).unwrap();
        assert_eq!(
            record,
            json!({ "id": "1", "recipeName": "Default", "name": "Feature", "step": { "id": "1" } })
        );
    }

    #[test]
    fn enqueue_after_partial_dequeue_appends_past_maximum() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "A")).unwrap();
        queue.enqueue(&id, &step("2", "B")).unwrap();
        assert_eq!(queue.dequeue(&id).unwrap().unwrap().name, "A");

        queue.enqueue(&id, &step("3", "C")).unwrap();

        let dir = temp.path().join(QUEUE_DIR).join(id.as_str());
        assert!(dir.join("2").is_file());
        assert_eq!(queue.dequeue(&id).unwrap().unwrap().name, "B");
        assert_eq!(queue.dequeue(&id).unwrap().unwrap().name, "C");
    }

    #[test]
    fn dequeue_unknown_execution_is_none() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        assert!(queue.dequeue(&ExecutionId::new()).unwrap().is_none());
    }

    #[test]
    fn empty_execution_folder_is_removed() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "A")).unwrap();
        queue.dequeue(&id).unwrap();

        assert!(!temp.path().join(QUEUE_DIR).join(id.as_str()).exists());
        assert!(queue.executions().unwrap().is_empty());
    }

    #[test]
    fn executions_are_namespaced() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let first = ExecutionId::new();
        let second = ExecutionId::new();

        queue.enqueue(&first, &step("1", "A")).unwrap();
        queue.enqueue(&second, &step("1", "B")).unwrap();

        assert_eq!(queue.pending(&first).unwrap(), 1);
        assert_eq!(queue.dequeue(&second).unwrap().unwrap().name, "B");
        assert_eq!(queue.dequeue(&first).unwrap().unwrap().name, "A");
    }

    #[test]
    fn stray_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "A")).unwrap();
        let dir = temp.path().join(QUEUE_DIR).join(id.as_str());
        fs::write(dir.join("README"), "not a step").unwrap();

        assert_eq!(queue.pending(&id).unwrap(), 1);
        assert_eq!(queue.dequeue(&id).unwrap().unwrap().name, "A");
        assert!(queue.dequeue(&id).unwrap().is_none());
    }

    #[test]
    fn drain_discards_everything() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        for n in 1..=3 {
            queue.enqueue(&id, &step(&n.to_string(), "A")).unwrap();
        }

        assert_eq!(queue.drain(&id).unwrap(), 3);
        assert_eq!(queue.pending(&id).unwrap(), 0);
        assert!(queue.dequeue(&id).unwrap().is_none());
    }

    #[test]
    fn corrupt_record_is_reported_and_removed() {
        let temp = TempDir::new().unwrap();
        let queue = queue(&temp);
        let id = ExecutionId::new();

        queue.enqueue(&id, &step("1", "A")).unwrap();
        let dir = temp.path().join(QUEUE_DIR).join(id.as_str());
        fs::write(dir.join("0"), "{ broken").unwrap();
        queue.enqueue(&id, &step("2", "B")).unwrap();

        let err = queue.dequeue(&id).unwrap_err();
        assert!(matches!(err, RecipeError::QueueRecord { .. }));
        assert_eq!(queue.dequeue(&id).unwrap().unwrap().name, "B");
    }

    #[test]
    fn queue_survives_reopening() {
        let temp = TempDir::new().unwrap();
        let id = ExecutionId::new();

        queue(&temp).enqueue(&id, &step("1", "A")).unwrap();

        let reopened = queue(&temp);
        assert_eq!(reopened.executions().unwrap(), vec![id.clone()]);
        assert_eq!(reopened.dequeue(&id).unwrap().unwrap().name, "A");
    }
}
