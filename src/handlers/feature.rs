//! The `Feature` step: enables and disables tenant features.
//!
//! ```json
//! { "Feature": { "disable": ["Orchard.Widgets"], "enable": ["Orchard.Blogs"] } }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::info;

use super::{RecipeContext, StepHandler};
use crate::tenant::{ShellDescriptorManager, ShellFeature};

/// Payload of a `Feature` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeaturePayload {
    #[serde(alias = "Enable")]
    pub enable: Vec<String>,
    #[serde(alias = "Disable")]
    pub disable: Vec<String>,
}

/// Applies `Feature` steps to the tenant's shell descriptor.
pub struct FeatureStep {
    descriptors: Arc<ShellDescriptorManager>,
    available: BTreeSet<String>,
}

impl FeatureStep {
    /// `available` lists the features that may be toggled; an empty list
    /// allows any feature name.
    pub fn new(descriptors: Arc<ShellDescriptorManager>, available: Vec<String>) -> Self {
        Self {
            descriptors,
            available: available.into_iter().collect(),
        }
    }

    fn is_available(&self, name: &str) -> bool {
        self.available.is_empty() || self.available.contains(name)
    }
}

impl StepHandler for FeatureStep {
    fn names(&self) -> &[&str] {
        &["Feature"]
    }

    fn execute(&self, context: &mut RecipeContext) -> anyhow::Result<()> {
        let payload: FeaturePayload = match &context.step.step {
            serde_json::Value::Null => FeaturePayload::default(),
            value => serde_json::from_value(value.clone())
                .context("Invalid Feature step payload")?,
        };

        if let Some(missing) = payload.disable.iter().find(|f| !self.is_available(f)) {
            bail!("Could not disable feature {} because it was not found.", missing);
        }
        if let Some(missing) = payload.enable.iter().find(|f| !self.is_available(f)) {
            bail!("Could not enable feature {} because it was not found.", missing);
        }

        let current = self.descriptors.get_shell_descriptor()?.unwrap_or_default();

        let mut features: Vec<ShellFeature> = current
            .features
            .iter()
            .filter(|f| !payload.disable.contains(&f.name))
            .cloned()
            .collect();
        for name in &payload.enable {
            if !features.iter().any(|f| &f.name == name) {
                features.push(ShellFeature::new(name.as_str()));
            }
        }

        if features == current.features && current.serial_number > 0 {
            return Ok(());
        }

        self.descriptors.update_shell_descriptor(
            current.serial_number,
            features,
            current.parameters,
        )?;

        info!(
            "Feature step applied: enabled [{}], disabled [{}]",
            payload.enable.join(", "),
            payload.disable.join(", ")
        );
        Ok(())
    }
}
