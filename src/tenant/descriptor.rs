//! Versioned tenant feature set.
//!
//! The shell descriptor lists the features enabled for a tenant. Every
//! update names the serial number it was based on; an update based on a
//! stale serial fails with [`RecipeError::ConcurrencyConflict`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::events::EventBus;
use crate::error::{RecipeError, Result};

/// Descriptor file name inside the tenant's site folder.
pub const DESCRIPTOR_FILE: &str = "shell-descriptor.yml";

/// An enabled feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShellFeature {
    pub name: String,
}

impl ShellFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A component parameter stored with the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellParameter {
    pub component: String,
    pub name: String,
    pub value: String,
}

/// Enabled features and parameters of a tenant, with a serial number.
///
/// Serial 0 means the descriptor was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellDescriptor {
    pub serial_number: u64,
    #[serde(default)]
    pub features: Vec<ShellFeature>,
    #[serde(default)]
    pub parameters: Vec<ShellParameter>,
}

impl ShellDescriptor {
    /// Names of the enabled features, in order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    /// Whether a feature is enabled.
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }
}

/// Loads and updates the descriptor file of one tenant.
pub struct ShellDescriptorManager {
    path: PathBuf,
    tenant: String,
    events: Arc<EventBus>,
    lock: Mutex<()>,
}

impl ShellDescriptorManager {
    pub fn new(path: impl Into<PathBuf>, tenant: impl Into<String>, events: Arc<EventBus>) -> Self {
        Self {
            path: path.into(),
            tenant: tenant.into(),
            events,
            lock: Mutex::new(()),
        }
    }

    /// Manager for `<app_data>/Sites/<tenant>/shell-descriptor.yml`.
    pub fn for_tenant(app_data: &Path, tenant: &str, events: Arc<EventBus>) -> Self {
        let path = app_data.join("Sites").join(tenant).join(DESCRIPTOR_FILE);
        Self::new(path, tenant, events)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// The current descriptor, or `None` if it was never written.
    pub fn get_shell_descriptor(&self) -> Result<Option<ShellDescriptor>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load()
    }

    /// Replace features and parameters, based on the `prior_serial` the
    /// caller read.
    ///
    /// On success the serial advances by one and `shell_descriptor_changed`
    /// is raised.
    pub fn update_shell_descriptor(
        &self,
        prior_serial: u64,
        features: Vec<ShellFeature>,
        parameters: Vec<ShellParameter>,
    ) -> Result<ShellDescriptor> {
        let descriptor = {
            let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

            let current = self.load()?.map_or(0, |d| d.serial_number);
            if current != prior_serial {
                return Err(RecipeError::ConcurrencyConflict {
                    prior: prior_serial,
                    current,
                });
            }

            let descriptor = ShellDescriptor {
                serial_number: current + 1,
                features,
                parameters,
            };
            self.save(&descriptor)?;
            descriptor
        };

        info!(
            "Updated shell descriptor for tenant '{}' to serial {}",
            self.tenant, descriptor.serial_number
        );
        self.events
            .shell_descriptor_changed(&descriptor, &self.tenant);

        Ok(descriptor)
    }

    fn load(&self) -> Result<Option<ShellDescriptor>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let descriptor =
            serde_yaml::from_str(&content).map_err(|e| RecipeError::ConfigParseError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(Some(descriptor))
    }

    fn save(&self, descriptor: &ShellDescriptor) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_yaml::to_string(descriptor).context("Failed to serialize shell descriptor")?;

        // Write to a temp file, then rename over the descriptor.
        let temp_path = self.path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl std::fmt::Debug for ShellDescriptorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellDescriptorManager")
            .field("path", &self.path)
            .field("tenant", &self.tenant)
            .finish()
    }
}
