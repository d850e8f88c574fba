//! Error types for recipe operations.
//!
//! This module defines [`RecipeError`], the primary error type used throughout
//! the engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `RecipeError` for failures callers need to tell apart (parse errors,
//!   fatal step failures, descriptor conflicts)
//! - Use `anyhow::Error` (via `RecipeError::Other`) inside stores and handlers
//! - Step failures are fatal for their execution and are never retried

use std::path::PathBuf;
use thiserror::Error;

use crate::tenant::TenantState;

/// Core error type for recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The recipe document is not a well-formed key/value document.
    #[error("Failed to parse recipe '{source_name}': {message}")]
    RecipeParse {
        source_name: String,
        message: String,
    },

    /// A step handler failed; the rest of the execution was discarded.
    #[error("Recipe execution with ID {execution_id} failed because the step '{step}' failed to execute: {message}")]
    StepFailed {
        execution_id: String,
        step: String,
        message: String,
    },

    /// No registered handler claims the step name.
    #[error("Recipe execution with ID {execution_id} failed because no matching handler for recipe step '{step}' was found")]
    UnhandledStep { execution_id: String, step: String },

    /// Two handlers claim the same step name.
    #[error("A handler for recipe step '{name}' is already registered")]
    HandlerConflict { name: String },

    /// Shell descriptor update based on a stale serial number.
    #[error("Invalid serial number for shell descriptor: got {prior}, current is {current}")]
    ConcurrencyConflict { prior: u64, current: u64 },

    /// The tenant is in the wrong state for the operation.
    #[error("Tenant '{tenant}' is {state}")]
    InvalidTenantState { tenant: String, state: TenantState },

    /// No ledger rows exist for the execution.
    #[error("No records were found for recipe execution ID {execution_id}")]
    NoRecipeResults { execution_id: String },

    /// An execution id that cannot be used as a store key.
    #[error("Invalid execution ID: {value:?}")]
    InvalidExecutionId { value: String },

    /// Failed to parse a configuration or state file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A queued step record could not be read back.
    #[error("Corrupt recipe queue record at {path}: {message}")]
    QueueRecord { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for recipe operations.
pub type Result<T> = std::result::Result<T, RecipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_parse_displays_source_and_message() {
        let err = RecipeError::RecipeParse {
            source_name: "blog.recipe.json".into(),
            message: "expected value at line 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("blog.recipe.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn step_failed_displays_execution_step_and_message() {
        let err = RecipeError::StepFailed {
            execution_id: "abc123".into(),
            step: "Feature".into(),
            message: "feature not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("'Feature'"));
        assert!(msg.contains("feature not found"));
    }

    #[test]
    fn unhandled_step_mentions_missing_handler() {
        let err = RecipeError::UnhandledStep {
            execution_id: "abc123".into(),
            step: "Migrations".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no matching handler"));
        assert!(msg.contains("Migrations"));
    }

    #[test]
    fn concurrency_conflict_displays_both_serials() {
        let err = RecipeError::ConcurrencyConflict {
            prior: 3,
            current: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn invalid_tenant_state_names_tenant() {
        let err = RecipeError::InvalidTenantState {
            tenant: "Default".into(),
            state: TenantState::Running,
        };
        assert_eq!(err.to_string(), "Tenant 'Default' is running");
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RecipeError = io_err.into();
        assert!(matches!(err, RecipeError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts_to_other() {
        let err: RecipeError = anyhow::anyhow!("store offline").into();
        assert!(matches!(err, RecipeError::Other(_)));
        assert_eq!(err.to_string(), "store offline");
    }
}
