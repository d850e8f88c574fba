//! Tenant shell settings.
//!
//! The tenant state lives in `Sites/<tenant>/settings.yml`, next to the shell
//! descriptor but independent of it: a descriptor can exist for a tenant whose
//! setup never finished.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecipeError, Result};

/// Settings file name inside the tenant's site folder.
pub const SETTINGS_FILE: &str = "settings.yml";

/// Lifecycle state of a tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantState {
    #[default]
    Uninitialized,
    Initializing,
    Running,
    Disabled,
}

impl fmt::Display for TenantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantState::Uninitialized => write!(f, "uninitialized"),
            TenantState::Initializing => write!(f, "initializing"),
            TenantState::Running => write!(f, "running"),
            TenantState::Disabled => write!(f, "disabled"),
        }
    }
}

/// Name and state of a tenant shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSettings {
    pub name: String,
    #[serde(default)]
    pub state: TenantState,
}

impl ShellSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TenantState::Uninitialized,
        }
    }
}

/// Settings shared between the host, the setup flow and step handlers.
pub type SharedShellSettings = Arc<RwLock<ShellSettings>>;

/// Copy the current settings out of the shared cell.
pub fn snapshot(settings: &SharedShellSettings) -> ShellSettings {
    settings.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Set the tenant state, returning the previous one.
pub fn set_state(settings: &SharedShellSettings, state: TenantState) -> TenantState {
    let mut guard = settings.write().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut guard.state, state)
}

/// Move from `from` to `to`, or return the state that blocked the move.
pub fn transition(
    settings: &SharedShellSettings,
    from: TenantState,
    to: TenantState,
) -> std::result::Result<(), TenantState> {
    let mut guard = settings.write().unwrap_or_else(|e| e.into_inner());
    if guard.state != from {
        return Err(guard.state);
    }
    guard.state = to;
    Ok(())
}

/// Reads and writes a tenant's `settings.yml`.
#[derive(Debug, Clone)]
pub struct ShellSettingsStore {
    path: PathBuf,
}

impl ShellSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `<app_data>/Sites/<tenant>/settings.yml`.
    pub fn for_tenant(app_data: &Path, tenant: &str) -> Self {
        Self::new(app_data.join("Sites").join(tenant).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, or fresh `Uninitialized` settings when the file is
    /// missing.
    pub fn load(&self, tenant: &str) -> Result<ShellSettings> {
        if !self.path.exists() {
            return Ok(ShellSettings::new(tenant));
        }

        let content = fs::read_to_string(&self.path)?;
        let mut loaded: ShellSettings =
            serde_yaml::from_str(&content).map_err(|e| RecipeError::ConfigParseError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        loaded.name = tenant.to_string();
        Ok(loaded)
    }

    pub fn save(&self, settings: &ShellSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_yaml::to_string(settings).context("Failed to serialize shell settings")?;
        let temp_path = self.path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Saved tenant '{}' as {}", settings.name, settings.state);
        Ok(())
    }

    /// Write the current contents of the shared settings.
    pub fn persist(&self, settings: &SharedShellSettings) -> Result<()> {
        self.save(&snapshot(settings))
    }
}
