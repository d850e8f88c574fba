//! Resume command implementation.
//!
//! Steps queued by a process that stopped before finishing stay on disk.
//! `orchard resume` schedules them again and pumps the task engine.

use crate::cli::args::ResumeArgs;
use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display;

/// The resume command implementation.
pub struct ResumeCommand {
    workspace: Workspace,
    args: ResumeArgs,
}

impl ResumeCommand {
    pub fn new(workspace: Workspace, args: ResumeArgs) -> Self {
        Self { workspace, args }
    }
}

impl Command for ResumeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;

        let candidates = match &self.args.execution_id {
            Some(raw) => vec![ExecutionId::parse(raw)?],
            None => host.interrupted_executions()?,
        };

        let mut resumed = Vec::new();
        for execution_id in candidates {
            if host.resume(&execution_id)? {
                resumed.push(execution_id);
            } else {
                ui.warning(&format!("Execution {} has no queued steps", execution_id));
            }
        }

        if resumed.is_empty() {
            ui.message("Nothing to resume");
            return Ok(CommandResult::success());
        }

        let outcome = host.pump();

        for execution_id in &resumed {
            if let Ok(result) = host.result(execution_id) {
                display::show_result(ui, &result);
            }
        }

        match outcome {
            Ok(_) => {
                ui.success(&format!("Resumed {} execution(s)", resumed.len()));
                Ok(CommandResult::success())
            }
            Err(e @ (RecipeError::StepFailed { .. } | RecipeError::UnhandledStep { .. })) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}
