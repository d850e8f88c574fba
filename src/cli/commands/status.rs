//! Status command implementation.
//!
//! `orchard status` shows the tenant and every execution in the result
//! ledger; `orchard status <id>` shows the steps of one execution.

use crate::cli::args::StatusArgs;
use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;
use crate::host::RecipeHost;
use crate::ledger::RecipeResult;
use crate::tenant::settings;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display;

/// The status command implementation.
pub struct StatusCommand {
    workspace: Workspace,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(workspace: Workspace, args: StatusArgs) -> Self {
        Self { workspace, args }
    }

    fn show_execution(
        &self,
        host: &RecipeHost,
        raw_id: &str,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let execution_id = ExecutionId::parse(raw_id)?;
        let result = match host.result(&execution_id) {
            Ok(result) => result,
            Err(e @ RecipeError::NoRecipeResults { .. }) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if self.args.json {
            print_json(ui, &result)?;
        } else {
            display::show_result(ui, &result);
        }
        Ok(CommandResult::success())
    }

    fn show_all(&self, host: &RecipeHost, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut results = Vec::new();
        for execution_id in host.ledger().executions()? {
            results.push(host.result(&execution_id)?);
        }

        if self.args.json {
            print_json(ui, &results)?;
            return Ok(CommandResult::success());
        }

        let shell = settings::snapshot(host.settings());
        ui.show_header(&format!("Tenant: {} ({})", shell.name, shell.state));

        if let Some(descriptor) = host.descriptors().get_shell_descriptor()? {
            ui.message(&format!(
                "Shell descriptor: serial {}, {} feature(s)",
                descriptor.serial_number,
                descriptor.features.len()
            ));
            for name in descriptor.feature_names() {
                ui.detail(&name);
            }
        } else {
            ui.message("Shell descriptor: not created");
        }
        ui.message("");

        if results.is_empty() {
            ui.message("No recipe executions recorded");
            return Ok(CommandResult::success());
        }

        ui.message("Executions:");
        for result in &results {
            show_summary(ui, result);
        }

        let interrupted = host.interrupted_executions()?;
        if !interrupted.is_empty() {
            ui.message("");
            ui.warning(&format!(
                "{} execution(s) have queued steps. Run 'orchard resume' to continue.",
                interrupted.len()
            ));
        }

        Ok(CommandResult::success())
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;
        match &self.args.execution_id {
            Some(id) => self.show_execution(&host, id, ui),
            None => self.show_all(&host, ui),
        }
    }
}

fn show_summary(ui: &mut dyn UserInterface, result: &RecipeResult) {
    let recipe = result
        .steps
        .first()
        .map(|s| s.recipe_name.as_str())
        .unwrap_or_default();
    let line = format!(
        "{} {}: {}",
        result.execution_id,
        recipe,
        display::summarize(result)
    );

    if result.failure().is_some() {
        ui.error(&line);
    } else if result.is_completed() {
        ui.success(&line);
    } else {
        ui.pending(&line);
    }
}

fn print_json<T: serde::Serialize + ?Sized>(ui: &mut dyn UserInterface, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| RecipeError::Other(e.into()))?;
    ui.message(&json);
    Ok(())
}
