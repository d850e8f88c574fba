//! The `ActivateShell` step appended by tenant setup.

use std::sync::Arc;

use tracing::info;

use super::{RecipeContext, StepHandler};
use crate::tenant::settings::{self, SharedShellSettings};
use crate::tenant::{ShellSettingsStore, TenantState};

/// Step name queued by setup after the setup recipe's own steps.
pub const ACTIVATE_SHELL: &str = "ActivateShell";

/// Marks the tenant as running and saves its settings.
pub struct ActivateShellStep {
    settings: SharedShellSettings,
    store: Arc<ShellSettingsStore>,
}

impl ActivateShellStep {
    pub fn new(settings: SharedShellSettings, store: Arc<ShellSettingsStore>) -> Self {
        Self { settings, store }
    }
}

impl StepHandler for ActivateShellStep {
    fn names(&self) -> &[&str] {
        &[ACTIVATE_SHELL]
    }

    fn execute(&self, context: &mut RecipeContext) -> anyhow::Result<()> {
        let previous = settings::set_state(&self.settings, TenantState::Running);
        self.store.persist(&self.settings)?;
        let tenant = settings::snapshot(&self.settings).name;
        info!(
            "Activated tenant '{}' ({} -> running) for execution {}",
            tenant, previous, context.execution_id
        );
        Ok(())
    }
}
