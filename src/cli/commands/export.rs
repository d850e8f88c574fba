//! Export command implementation.
//!
//! `orchard export` writes the tenant's enabled features as a recipe that
//! `orchard run` can replay on another tenant.

use std::fs;

use anyhow::Context;
use chrono::Utc;

use crate::cli::args::ExportArgs;
use crate::error::{RecipeError, Result};
use crate::recipe::{FeatureExportStep, RecipeBuilder, RecipeMetadata, RecipeMetadataStep};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, Workspace};

/// The export command implementation.
pub struct ExportCommand {
    workspace: Workspace,
    args: ExportArgs,
}

impl ExportCommand {
    pub fn new(workspace: Workspace, args: ExportArgs) -> Self {
        Self { workspace, args }
    }
}

impl Command for ExportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let host = self.workspace.open_host()?;
        let tenant = host.config().tenant.clone();

        let Some(descriptor) = host.descriptors().get_shell_descriptor()? else {
            ui.error(&format!(
                "Tenant '{}' has no shell descriptor. Run 'orchard setup' first.",
                tenant
            ));
            return Ok(CommandResult::failure(2));
        };

        let mut metadata = RecipeMetadata::named(self.args.name.clone().unwrap_or(tenant.clone()));
        metadata.description = format!("Export of tenant '{}'", tenant);

        let mut builder = RecipeBuilder::new();
        builder
            .add_step(Box::new(RecipeMetadataStep::new(metadata)))
            .add_step(Box::new(FeatureExportStep::new(descriptor.feature_names())));

        let document = builder.build(Utc::now());
        let json =
            serde_json::to_string_pretty(&document).map_err(|e| RecipeError::Other(e.into()))?;

        match &self.args.output {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    self.workspace.project_root.join(path)
                };
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, format!("{}\n", json))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ui.success(&format!(
                    "Exported {} feature(s) to {}",
                    descriptor.features.len(),
                    path.display()
                ));
            }
            None => ui.message(&json),
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeParser;
    use crate::tenant::ShellFeature;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn project_with_features(features: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let host = Workspace::new(temp.path()).open_host().unwrap();
        host.descriptors()
            .update_shell_descriptor(
                0,
                features.iter().map(|f| ShellFeature::new(*f)).collect(),
                Vec::new(),
            )
            .unwrap();
        temp
    }

    #[test]
    fn exports_to_stdout() {
        let temp = project_with_features(&["Orchard.Blogs", "Orchard.Media"]);
        let mut ui = MockUI::new();

        let result = ExportCommand::new(Workspace::new(temp.path()), ExportArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let recipe = RecipeParser::parse(
            &ui.messages()[0],
            crate::recipe::RecipeFormat::Json,
            "export",
        )
        .unwrap();
        assert_eq!(recipe.name(), "Default");
        assert_eq!(recipe.steps.len(), 1);
        assert_eq!(recipe.steps[0].name, "Feature");
        assert!(recipe.metadata.export_utc.is_some());
    }

    #[test]
    fn exports_to_file_with_name() {
        let temp = project_with_features(&["Orchard.Blogs"]);
        let mut ui = MockUI::new();
        let args = ExportArgs {
            name: Some("Blog".to_string()),
            output: Some("recipes/blog.recipe.json".into()),
        };

        ExportCommand::new(Workspace::new(temp.path()), args)
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_success("Exported 1 feature(s)"));
        let recipe =
            RecipeParser::parse_file(&temp.path().join("recipes/blog.recipe.json")).unwrap();
        assert_eq!(recipe.name(), "Blog");
    }

    #[test]
    fn requires_descriptor() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = ExportCommand::new(Workspace::new(temp.path()), ExportArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("has no shell descriptor"));
    }
}
