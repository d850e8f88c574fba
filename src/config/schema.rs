//! Configuration schema for `.orchard/config.yml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Features written to the minimum shell descriptor during setup.
pub const DEFAULT_SETUP_FEATURES: &[&str] = &[
    "Orchard.Logging.Console",
    "Orchard.Hosting",
    "Settings",
    "Orchard.Modules",
    "Orchard.Themes",
    "Orchard.Recipes",
];

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchardConfig {
    /// Tenant (shell) name.
    pub tenant: String,

    /// Application data directory, relative to the project root.
    pub app_data: PathBuf,

    /// Directories searched for `*.recipe.json` / `*.recipe.yml`.
    pub recipe_paths: Vec<PathBuf>,

    /// Features `Feature` steps may toggle. Empty allows any feature.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_features: Vec<String>,

    /// Features enabled by setup before the setup recipe runs.
    pub setup_features: Vec<String>,
}

impl Default for OrchardConfig {
    fn default() -> Self {
        Self {
            tenant: "Default".to_string(),
            app_data: PathBuf::from("App_Data"),
            recipe_paths: vec![PathBuf::from("recipes")],
            available_features: Vec::new(),
            setup_features: DEFAULT_SETUP_FEATURES
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl OrchardConfig {
    /// Absolute application data directory.
    pub fn app_data_dir(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.app_data)
    }

    /// Absolute recipe directories.
    pub fn recipe_dirs(&self, project_root: &Path) -> Vec<PathBuf> {
        self.recipe_paths
            .iter()
            .map(|p| resolve(project_root, p))
            .collect()
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
