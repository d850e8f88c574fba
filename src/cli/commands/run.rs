//! Run command implementation.
//!
//! `orchard run <recipe>` schedules a recipe and pumps the task engine until
//! the execution finishes or a step fails.

use std::path::Path;

use tracing::debug;

use crate::cli::args::RunArgs;
use crate::error::{RecipeError, Result};
use crate::host::RecipeHost;
use crate::recipe::{Recipe, RecipeParser};
use crate::tenant::TenantState;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};
use super::display;

/// The run command implementation.
pub struct RunCommand {
    workspace: Workspace,
    args: RunArgs,
}

impl RunCommand {
    pub fn new(workspace: Workspace, args: RunArgs) -> Self {
        Self { workspace, args }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;

        let Some(recipe) = resolve_recipe(&host, &self.args.recipe)? else {
            ui.error(&format!("Recipe '{}' was not found", self.args.recipe));
            return Ok(CommandResult::failure(2));
        };

        let state = host.tenant_state();
        if state != TenantState::Running {
            ui.error(&format!(
                "Tenant '{}' is {}. Run 'orchard setup' first.",
                host.config().tenant,
                state
            ));
            return Ok(CommandResult::failure(1));
        }

        ui.show_header(&format!("Recipe: {}", recipe.name()));

        let Some(execution_id) = host.execute(&recipe)? else {
            ui.warning(&format!("Recipe '{}' has no steps", recipe.name()));
            return Ok(CommandResult::success());
        };

        if self.args.no_execute {
            ui.success(&format!(
                "Queued {} step(s) as execution {}",
                recipe.steps.len(),
                execution_id
            ));
            return Ok(CommandResult::success());
        }

        let outcome = host.pump();
        let result = host.result(&execution_id)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| RecipeError::Other(e.into()))?;
            ui.message(&json);
        } else {
            display::show_result(ui, &result);
        }

        match outcome {
            Ok(_) => {
                ui.success(&format!("Recipe '{}' executed", recipe.name()));
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

/// Find a recipe by file path, falling back to a harvested recipe name.
pub fn resolve_recipe(host: &RecipeHost, reference: &str) -> Result<Option<Recipe>> {
    let candidate = Path::new(reference);
    let path = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        host.project_root().join(candidate)
    };

    if path.is_file() {
        debug!("Reading recipe from {}", path.display());
        return RecipeParser::parse_file(&path).map(Some);
    }

    Ok(host.harvester().find_recipe(reference)?.map(|h| h.recipe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_recipe(file: &str, content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let recipes = temp.path().join("recipes");
        fs::create_dir_all(&recipes).unwrap();
        fs::write(recipes.join(file), content).unwrap();
        Workspace::new(temp.path())
            .open_host()
            .unwrap()
            .set_tenant_state(TenantState::Running)
            .unwrap();
        temp
    }

    fn run(temp: &TempDir, args: RunArgs) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let cmd = RunCommand::new(Workspace::new(temp.path()), args);
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    fn args(recipe: &str) -> RunArgs {
        RunArgs {
            recipe: recipe.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn runs_harvested_recipe_by_name() {
        let temp = project_with_recipe(
            "blog.recipe.json",
            r#"{"recipe": {"name": "Blog"}, "Feature": {"enable": ["Orchard.Blogs"]}}"#,
        );

        let (result, ui) = run(&temp, args("blog"));

        assert!(result.success);
        assert!(ui.has_success("Feature (Blog)"));
        assert!(ui.has_success("Recipe 'Blog' executed"));
        assert!(ui.has_message("1/1 steps completed"));
    }

    #[test]
    fn runs_recipe_from_path() {
        let temp = project_with_recipe(
            "blog.recipe.yml",
            "recipe:\n  name: Blog\nFeature:\n  enable: [Orchard.Blogs]\n",
        );

        let (result, ui) = run(&temp, args("recipes/blog.recipe.yml"));

        assert!(result.success);
        assert_eq!(ui.headers(), ["Recipe: Blog".to_string()]);
    }

    #[test]
    fn refuses_tenant_that_is_not_set_up() {
        let temp = TempDir::new().unwrap();
        let recipes = temp.path().join("recipes");
        fs::create_dir_all(&recipes).unwrap();
        fs::write(
            recipes.join("blog.recipe.json"),
            r#"{"recipe": {"name": "Blog"}, "Feature": {"enable": ["A"]}}"#,
        )
        .unwrap();

        let (result, ui) = run(&temp, args("Blog"));

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Tenant 'Default' is uninitialized. Run 'orchard setup' first."));

        let host = Workspace::new(temp.path()).open_host().unwrap();
        assert!(host.ledger().executions().unwrap().is_empty());
        assert!(host.descriptors().get_shell_descriptor().unwrap().is_none());
    }

    #[test]
    fn unknown_recipe_fails_with_code_2() {
        let temp = TempDir::new().unwrap();
        let (result, ui) = run(&temp, args("missing"));

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("Recipe 'missing' was not found"));
    }

    #[test]
    fn unhandled_step_fails_with_code_1() {
        let temp = project_with_recipe(
            "broken.recipe.json",
            r#"{"recipe": {"name": "Broken"}, "Mystery": {}}"#,
        );

        let (result, ui) = run(&temp, args("Broken"));

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("no matching handler for recipe step 'Mystery'"));
        assert!(ui.has_pending("Mystery (Broken)"));
    }

    #[test]
    fn empty_recipe_warns() {
        let temp = project_with_recipe("empty.recipe.json", r#"{"recipe": {"name": "Empty"}}"#);

        let (result, ui) = run(&temp, args("Empty"));

        assert!(result.success);
        assert!(ui.has_warning("Recipe 'Empty' has no steps"));
    }

    #[test]
    fn no_execute_leaves_steps_queued() {
        let temp = project_with_recipe(
            "blog.recipe.json",
            r#"{"recipe": {"name": "Blog"}, "Feature": {"enable": ["A"]}, "Feature2": {}}"#,
        );

        let (result, ui) = run(
            &temp,
            RunArgs {
                no_execute: true,
                ..args("Blog")
            },
        );

        assert!(result.success);
        assert!(ui.has_success("Queued 2 step(s)"));

        let host = Workspace::new(temp.path()).open_host().unwrap();
        assert_eq!(host.interrupted_executions().unwrap().len(), 1);
    }

    #[test]
    fn json_output_uses_camel_case() {
        let temp = project_with_recipe(
            "blog.recipe.json",
            r#"{"recipe": {"name": "Blog"}, "Feature": {"enable": ["A"]}}"#,
        );

        let (_, ui) = run(
            &temp,
            RunArgs {
                json: true,
                ..args("Blog")
            },
        );

        assert!(ui.has_message("\"executionId\""));
        assert!(ui.has_message("\"isSuccessful\": true"));
    }
}
