//! Tenant setup.
//!
//! Setting up a tenant writes its minimum shell descriptor, runs the setup
//! recipe and finally activates the shell:
//!
//! 1. the tenant moves from `Uninitialized` to `Initializing`
//! 2. the descriptor is written with the setup features
//! 3. the recipe is scheduled and an `ActivateShell` step is appended to the
//!    same execution
//! 4. the task engine is pumped until the execution finishes
//! 5. the tenant moves to `Running` and its settings are saved
//!
//! If anything fails the tenant returns to `Uninitialized` and setup can be
//! run again from the beginning; the minimum descriptor is rewritten over
//! whatever the failed attempt left behind.

use serde_json::Value;
use tracing::{error, info};

use crate::error::{RecipeError, Result};
use crate::execution::ExecutionId;
use crate::handlers::activate_shell::ACTIVATE_SHELL;
use crate::host::RecipeHost;
use crate::queue::StepQueue;
use crate::recipe::{Recipe, RecipeStep};
use crate::tenant::settings;
use crate::tenant::{ShellFeature, TenantState};

/// Input of a tenant setup.
#[derive(Debug, Clone)]
pub struct SetupContext {
    /// The setup recipe.
    pub recipe: Recipe,

    /// Features enabled in addition to the configured setup features.
    pub enabled_features: Vec<String>,
}

impl SetupContext {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            enabled_features: Vec::new(),
        }
    }
}

/// Runs tenant setup against a [`RecipeHost`].
pub struct SetupService<'a> {
    host: &'a RecipeHost,
}

impl<'a> SetupService<'a> {
    pub fn new(host: &'a RecipeHost) -> Self {
        Self { host }
    }

    /// Set up the tenant and return the id of the setup execution.
    pub fn setup(&self, context: SetupContext) -> Result<ExecutionId> {
        let shell = self.host.settings();
        let tenant = settings::snapshot(shell).name;

        settings::transition(shell, TenantState::Uninitialized, TenantState::Initializing)
            .map_err(|state| RecipeError::InvalidTenantState {
                tenant: tenant.clone(),
                state,
            })?;
        info!("Setting up tenant '{}' with recipe '{}'", tenant, context.recipe.name());

        match self.run(context) {
            Ok(execution_id) => {
                self.host.set_tenant_state(TenantState::Running)?;
                info!("Tenant '{}' is running", tenant);
                Ok(execution_id)
            }
            Err(e) => {
                error!("Setup of tenant '{}' failed: {}", tenant, e);
                if let Err(save) = self.host.set_tenant_state(TenantState::Uninitialized) {
                    error!("Could not reset tenant '{}': {}", tenant, save);
                }
                Err(e)
            }
        }
    }

    /// Configured setup features followed by any extra ones, without
    /// duplicates.
    fn setup_features(&self, extra: Vec<String>) -> Vec<ShellFeature> {
        let mut names = self.host.config().setup_features.clone();
        for name in extra {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.into_iter().map(ShellFeature::new).collect()
    }

    fn run(&self, context: SetupContext) -> Result<ExecutionId> {
        let features = self.setup_features(context.enabled_features);

        let descriptors = self.host.descriptors();
        let prior = descriptors
            .get_shell_descriptor()?
            .map_or(0, |d| d.serial_number);
        descriptors.update_shell_descriptor(prior, features, Vec::new())?;
        self.host.pump()?;

        let recipe = &context.recipe;
        let execution_id = match self.host.execute(recipe)? {
            Some(id) => id,
            None => {
                let id = ExecutionId::new();
                self.host.scheduler().schedule_work(&id)?;
                id
            }
        };

        let activate = RecipeStep::new(
            (recipe.steps.len() + 1).to_string(),
            recipe.name(),
            ACTIVATE_SHELL,
            Value::Null,
        );
        self.host.queue().enqueue(&execution_id, &activate)?;

        self.host.pump()?;
        Ok(execution_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchardConfig;
    use crate::error::RecipeError;
    use crate::recipe::{RecipeMetadata, RecipeParser, RecipeFormat};
    use serde_json::json;
    use tempfile::TempDir;

    fn host(temp: &TempDir) -> RecipeHost {
        RecipeHost::open(temp.path(), &OrchardConfig::default()).unwrap()
    }

    fn state(host: &RecipeHost) -> TenantState {
        host.tenant_state()
    }

    fn broken() -> Recipe {
        Recipe::new(
            RecipeMetadata::named("Broken"),
            vec![("Feature", json!({"enable": ["Orchard.Blogs"]})), ("Unknown", json!({}))],
        )
    }

    #[test]
    fn setup_runs_recipe_and_activates_tenant() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);
        let recipe = RecipeParser::parse(
            r#"{ "recipe": { "name": "Blog", "isSetupRecipe": true },
                 "Feature": { "enable": ["Orchard.Blogs"] } }"#,
            RecipeFormat::Json,
            "blog.recipe.json",
        )
        .unwrap();

        let id = SetupService::new(&host)
            .setup(SetupContext::new(recipe))
            .unwrap();

        assert_eq!(state(&host), TenantState::Running);

        let descriptor = host.descriptors().get_shell_descriptor().unwrap().unwrap();
        assert!(descriptor.has_feature("Orchard.Recipes"));
        assert!(descriptor.has_feature("Orchard.Blogs"));

        // The ActivateShell step has no ledger row.
        let result = host.result(&id).unwrap();
        assert_eq!(result.steps.len(), 1);
        assert!(result.is_successful());
        assert_eq!(host.queue().pending(&id).unwrap(), 0);
    }

    #[test]
    fn setup_with_empty_recipe_still_activates() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);
        let recipe = Recipe::new(RecipeMetadata::named("Empty"), Vec::<(String, Value)>::new());

        SetupService::new(&host).setup(SetupContext::new(recipe)).unwrap();

        assert_eq!(state(&host), TenantState::Running);
        let descriptor = host.descriptors().get_shell_descriptor().unwrap().unwrap();
        assert_eq!(
            descriptor.feature_names(),
            OrchardConfig::default().setup_features
        );
    }

    #[test]
    fn extra_features_are_added_to_setup_features() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);
        let recipe = Recipe::new(RecipeMetadata::named("Empty"), Vec::<(String, Value)>::new());

        let mut context = SetupContext::new(recipe);
        context.enabled_features = vec!["Orchard.Blogs".into(), "Orchard.Recipes".into()];
        SetupService::new(&host).setup(context).unwrap();

        let mut expected = OrchardConfig::default().setup_features;
        expected.push("Orchard.Blogs".to_string());
        let descriptor = host.descriptors().get_shell_descriptor().unwrap().unwrap();
        assert_eq!(descriptor.feature_names(), expected);
    }

    #[test]
    fn failed_setup_restores_state() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);

        let err = SetupService::new(&host)
            .setup(SetupContext::new(broken()))
            .unwrap_err();

        assert!(matches!(err, RecipeError::UnhandledStep { .. }));
        assert_eq!(state(&host), TenantState::Uninitialized);
    }

    #[test]
    fn failed_setup_can_be_retried_after_reopening() {
        let temp = TempDir::new().unwrap();
        {
            let host = host(&temp);
            SetupService::new(&host)
                .setup(SetupContext::new(broken()))
                .unwrap_err();
            // The failed attempt left a descriptor behind.
            assert!(host.descriptors().get_shell_descriptor().unwrap().is_some());
        }

        let host = host(&temp);
        assert_eq!(state(&host), TenantState::Uninitialized);

        let recipe = Recipe::new(
            RecipeMetadata::named("Blog"),
            vec![("Feature", json!({"enable": ["Orchard.Media"]}))],
        );
        SetupService::new(&host)
            .setup(SetupContext::new(recipe))
            .unwrap();
        assert_eq!(state(&host), TenantState::Running);

        let descriptor = host.descriptors().get_shell_descriptor().unwrap().unwrap();
        assert!(descriptor.has_feature("Orchard.Media"));
        assert!(!descriptor.has_feature("Orchard.Blogs"));

        drop(host);
        assert_eq!(state(&self::host(&temp)), TenantState::Running);
    }

    #[test]
    fn setup_twice_is_rejected() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);
        let recipe = Recipe::new(RecipeMetadata::named("Blog"), vec![("Feature", json!({}))]);

        SetupService::new(&host)
            .setup(SetupContext::new(recipe.clone()))
            .unwrap();
        let err = SetupService::new(&host)
            .setup(SetupContext::new(recipe))
            .unwrap_err();

        assert!(matches!(
            err,
            RecipeError::InvalidTenantState {
                state: TenantState::Running,
                ..
            }
        ));
        assert_eq!(state(&host), TenantState::Running);
    }
}
