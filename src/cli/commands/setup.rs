//! Setup command implementation.
//!
//! `orchard setup [recipe]` provisions the tenant: it writes the initial
//! shell descriptor, runs a setup recipe and activates the shell.

use crate::cli::args::SetupArgs;
use crate::error::{RecipeError, Result};
use crate::host::RecipeHost;
use crate::recipe::Recipe;
use crate::setup::{SetupContext, SetupService};
use crate::tenant::TenantState;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display;
use super::run::resolve_recipe;

/// The setup command implementation.
pub struct SetupCommand {
    workspace: Workspace,
    args: SetupArgs,
}

impl SetupCommand {
    pub fn new(workspace: Workspace, args: SetupArgs) -> Self {
        Self { workspace, args }
    }

    fn find_recipe(&self, host: &RecipeHost) -> Result<Option<Recipe>> {
        match &self.args.recipe {
            Some(reference) => resolve_recipe(host, reference),
            None => Ok(host
                .harvester()
                .setup_recipes()?
                .into_iter()
                .next()
                .map(|h| h.recipe)),
        }
    }
}

impl Command for SetupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;
        let tenant = host.config().tenant.clone();

        let Some(recipe) = self.find_recipe(&host)? else {
            match &self.args.recipe {
                Some(name) => ui.error(&format!("Recipe '{}' was not found", name)),
                None => ui.error("No setup recipe was found"),
            }
            return Ok(CommandResult::failure(2));
        };

        ui.show_header(&format!("Setting up tenant '{}' with '{}'", tenant, recipe.name()));

        let mut context = SetupContext::new(recipe);
        context.enabled_features = self.args.features.clone();

        let outcome = SetupService::new(&host).setup(context);
        let execution_id = match outcome {
            Ok(id) => id,
            Err(RecipeError::InvalidTenantState {
                state: TenantState::Running,
                ..
            }) => {
                ui.error(&format!("Tenant '{}' is already set up", tenant));
                return Ok(CommandResult::failure(1));
            }
            Err(
                e @ (RecipeError::StepFailed { .. }
                | RecipeError::UnhandledStep { .. }
                | RecipeError::InvalidTenantState { .. }
                | RecipeError::ConcurrencyConflict { .. }),
            ) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        // Recipes without steps leave no ledger rows.
        if let Ok(result) = host.result(&execution_id) {
            display::show_result(ui, &result);
        }

        ui.success(&format!("Tenant '{}' is {}", tenant, host.tenant_state()));
        Ok(CommandResult::success())
    }
}
