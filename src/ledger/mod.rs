//! Step result ledger.
//!
//! One row per enqueued step records whether the step has run and how it
//! ended. Rows are created pending when the step is enqueued and completed
//! exactly once. [`RecipeResultAccessor`] exposes them for status polling.

pub mod accessor;
mod record;
mod store;

pub use accessor::{RecipeResult, RecipeResultAccessor, RecipeStepResult};
pub use record::{StepOutcome, StepResultRecord};
pub use store::{StepResultLedger, LEDGER_FILE};
