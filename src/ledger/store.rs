//! Step result storage (JSONL format).

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::debug;

use super::record::{StepOutcome, StepResultRecord};
use crate::execution::ExecutionId;

/// File name of the ledger below the application data directory.
pub const LEDGER_FILE: &str = "recipe-results.jsonl";

/// Append-mostly ledger of step results, one JSON row per line.
pub struct StepResultLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StepResultLedger {
    /// Create a ledger at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the ledger at `<app_data>/recipe-results.jsonl`.
    pub fn in_app_data(app_data: impl AsRef<Path>) -> Self {
        Self::new(app_data.as_ref().join(LEDGER_FILE))
    }

    /// Get the ledger path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append a pending row for a step that was just enqueued.
    pub fn record(
        &self,
        execution_id: &ExecutionId,
        recipe_name: &str,
        step_id: &str,
        step_name: &str,
    ) -> Result<()> {
        let _guard = self.guard();
        self.ensure_dir()?;

        let row = StepResultRecord::pending(execution_id, recipe_name, step_id, step_name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;

        let json = serde_json::to_string(&row)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Complete the first pending row matching the step.
    ///
    /// `recipe_name` narrows the match when it is present and non-blank.
    /// Returns `false` without writing when no pending row matches, which
    /// covers steps enqueued without a row and rows already completed.
    pub fn complete(
        &self,
        execution_id: &ExecutionId,
        recipe_name: Option<&str>,
        step_id: &str,
        step_name: &str,
        outcome: StepOutcome,
    ) -> Result<bool> {
        let _guard = self.guard();
        let recipe_name = recipe_name.filter(|name| !name.trim().is_empty());

        let mut rows = self.read_rows(|_| true)?;
        let found = rows.iter_mut().find(|row| {
            row.is_pending()
                && &row.execution_id == execution_id
                && row.step_id == step_id
                && row.step_name == step_name
                && recipe_name.map_or(true, |name| row.recipe_name == name)
        });

        match found {
            Some(row) => {
                row.complete(&outcome);
                self.rewrite_all(&rows)?;
                Ok(true)
            }
            None => {
                debug!(
                    "No pending result row for step '{}' ({}) of execution {}",
                    step_name, step_id, execution_id
                );
                Ok(false)
            }
        }
    }

    /// All rows for an execution.
    pub fn query(&self, execution_id: &ExecutionId) -> Result<Vec<StepResultRecord>> {
        let _guard = self.guard();
        self.read_rows(|row| &row.execution_id == execution_id)
    }

    /// Distinct execution ids in first-seen order.
    pub fn executions(&self) -> Result<Vec<ExecutionId>> {
        let _guard = self.guard();
        let mut ids: Vec<ExecutionId> = Vec::new();
        for row in self.read_rows(|_| true)? {
            if !ids.contains(&row.execution_id) {
                ids.push(row.execution_id);
            }
        }
        Ok(ids)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        Ok(())
    }

    fn read_rows(
        &self,
        predicate: impl Fn(&StepResultRecord) -> bool,
    ) -> Result<Vec<StepResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file =
            File::open(&self.path).with_context(|| format!("Failed to open {:?}", self.path))?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(row) = serde_json::from_str::<StepResultRecord>(&line) {
                if predicate(&row) {
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    fn rewrite_all(&self, rows: &[StepResultRecord]) -> Result<()> {
        self.ensure_dir()?;

        let temp = self.path.with_extension("jsonl.tmp");
        {
            let mut file =
                File::create(&temp).with_context(|| format!("Failed to create {:?}", temp))?;
            for row in rows {
                let json = serde_json::to_string(row)?;
                writeln!(file, "{}", json)?;
            }
        }
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;

        Ok(())
    }
}

impl std::fmt::Debug for StepResultLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepResultLedger")
            .field("path", &self.path)
            .finish()
    }
}
