//! Shared display helpers for execution results.
//!
//! Used by `run`, `status`, `setup` and `resume` so every command renders
//! ledger rows the same way.

use crate::ledger::{RecipeResult, RecipeStepResult};
use crate::ui::UserInterface;

/// Icon for a step's progress.
pub fn status_icon(step: &RecipeStepResult) -> &'static str {
    match (step.is_completed, step.is_successful) {
        (true, true) => "✓",
        (true, false) => "✗",
        (false, _) => "◌",
    }
}

/// Print a single step's line, styled by outcome.
pub fn show_step_result(ui: &mut dyn UserInterface, step: &RecipeStepResult) {
    let line = format!("{} ({})", step.step_name, step.recipe_name);
    match (step.is_completed, step.is_successful) {
        (true, true) => ui.success(&line),
        (true, false) => {
            let message = step.error_message.as_deref().unwrap_or("unknown error");
            ui.error(&format!("{}: {}", line, message));
        }
        (false, _) => ui.pending(&line),
    }
}

/// One-line progress summary, e.g. `2/3 steps completed, 1 failed`.
pub fn summarize(result: &RecipeResult) -> String {
    let total = result.steps.len();
    let completed = result.steps.iter().filter(|s| s.is_completed).count();
    let failed = result
        .steps
        .iter()
        .filter(|s| s.is_completed && !s.is_successful)
        .count();

    let mut summary = format!("{}/{} steps completed", completed, total);
    if failed > 0 {
        summary.push_str(&format!(", {} failed", failed));
    }
    summary
}

/// Print every step followed by the summary.
pub fn show_result(ui: &mut dyn UserInterface, result: &RecipeResult) {
    ui.message(&format!("Execution {}", result.execution_id));
    for step in &result.steps {
        show_step_result(ui, step);
    }
    ui.message("");
    ui.message(&summarize(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionId;
    use crate::ui::MockUI;

    fn step(name: &str, completed: bool, successful: bool, error: Option<&str>) -> RecipeStepResult {
        RecipeStepResult {
            recipe_name: "Blog".to_string(),
            step_name: name.to_string(),
            is_completed: completed,
            is_successful: successful,
            error_message: error.map(str::to_string),
        }
    }

    fn result() -> RecipeResult {
        RecipeResult {
            execution_id: ExecutionId::parse("abc123").unwrap(),
            steps: vec![
                step("Feature", true, true, None),
                step("Content", true, false, Some("boom")),
                step("Media", false, false, None),
            ],
        }
    }

    #[test]
    fn icons_follow_progress() {
        let result = result();
        assert_eq!(status_icon(&result.steps[0]), "✓");
        assert_eq!(status_icon(&result.steps[1]), "✗");
        assert_eq!(status_icon(&result.steps[2]), "◌");
    }

    #[test]
    fn steps_use_matching_ui_method() {
        let mut ui = MockUI::new();
        show_result(&mut ui, &result());

        assert!(ui.has_success("Feature (Blog)"));
        assert!(ui.has_error("Content (Blog): boom"));
        assert!(ui.has_pending("Media (Blog)"));
        assert!(ui.has_message("Execution abc123"));
    }

    #[test]
    fn summary_counts_failures() {
        assert_eq!(summarize(&result()), "2/3 steps completed, 1 failed");
    }
}
