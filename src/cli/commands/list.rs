//! List command implementation.
//!
//! `orchard list` shows every recipe found in the configured recipe
//! directories.

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::error::{RecipeError, Result};
use crate::recipe::HarvestedRecipe;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};

/// The list command implementation.
pub struct ListCommand {
    workspace: Workspace,
    args: ListArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipeListing {
    name: String,
    description: String,
    version: String,
    is_setup_recipe: bool,
    steps: usize,
    path: String,
}

impl From<&HarvestedRecipe> for RecipeListing {
    fn from(harvested: &HarvestedRecipe) -> Self {
        let metadata = &harvested.recipe.metadata;
        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            version: metadata.version.clone(),
            is_setup_recipe: metadata.is_setup_recipe,
            steps: harvested.recipe.steps.len(),
            path: harvested.path.display().to_string(),
        }
    }
}

impl ListCommand {
    pub fn new(workspace: Workspace, args: ListArgs) -> Self {
        Self { workspace, args }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;
        let harvester = host.harvester();
        let recipes = if self.args.setup {
            harvester.setup_recipes()?
        } else {
            harvester.harvest()?
        };

        if self.args.json {
            let listings: Vec<RecipeListing> = recipes.iter().map(RecipeListing::from).collect();
            let json = serde_json::to_string_pretty(&listings)
                .map_err(|e| RecipeError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if recipes.is_empty() {
            let dirs: Vec<String> = harvester
                .paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            ui.message(&format!("No recipes found in {}", dirs.join(", ")));
            return Ok(CommandResult::success());
        }

        ui.show_header("Recipes");
        for harvested in &recipes {
            let metadata = &harvested.recipe.metadata;
            let mut line = format!("{} ({} steps)", metadata.name, harvested.recipe.steps.len());
            if metadata.is_setup_recipe {
                line.push_str(" [setup]");
            }
            if !metadata.description.is_empty() {
                line = format!("{} - {}", line, metadata.description);
            }
            ui.message(&format!("  {}", line));
            ui.detail(&harvested.path.display().to_string());
        }

        Ok(CommandResult::success())
    }
}
