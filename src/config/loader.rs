//! Configuration file discovery and loading.

use crate::config::merger::merge_layers;
use crate::config::schema::OrchardConfig;
use crate::error::{RecipeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding configuration, below the project root.
pub const CONFIG_DIR: &str = ".orchard";

/// Paths to configuration files in merge order.
///
/// 1. Project config (`.orchard/config.yml`)
/// 2. Local overrides (`.orchard/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    /// Existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Find the project root by walking up from `start`.
///
/// Stops at the nearest directory containing `.orchard` or `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file as a raw YAML value.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| RecipeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load exactly one config file.
pub fn load_config_file(path: &Path) -> Result<OrchardConfig> {
    let value = load_config_value(path)?;
    from_value(value, path)
}

/// Load `.orchard/config.yml` merged with `.orchard/config.local.yml`.
///
/// Missing files are not an error; defaults fill in whatever is absent.
pub fn load_merged_config(project_root: &Path) -> Result<OrchardConfig> {
    let paths = ConfigPaths::discover(project_root);

    let mut layers = Vec::new();
    for path in paths.all_existing() {
        layers.push(load_config_value(path)?);
    }

    from_value(
        merge_layers(layers),
        &project_root.join(CONFIG_DIR).join("config.yml"),
    )
}

/// Load config with optional path override.
///
/// With an override only that file is loaded, without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<OrchardConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}

fn from_value(value: serde_yaml::Value, path: &Path) -> Result<OrchardConfig> {
    if value.is_null() {
        return Ok(OrchardConfig::default());
    }

    serde_yaml::from_value(value).map_err(|e| RecipeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, name: &str, content: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn missing_config_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config, OrchardConfig::default());
    }

    #[test]
    fn discover_finds_both_files_in_order() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "");
        write_config(temp.path(), "config.local.yml", "");

        let paths = ConfigPaths::discover(temp.path());
        let all = paths.all_existing();
        assert_eq!(all.len(), 2);
        assert!(all[0].ends_with("config.yml"));
        assert!(all[1].ends_with("config.local.yml"));
    }

    #[test]
    fn local_overrides_project() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "config.yml",
            "tenant: Blog\navailable_features: [A, B]\n",
        );
        write_config(temp.path(), "config.local.yml", "available_features: [C]\n");

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.tenant, "Blog");
        assert_eq!(config.available_features, vec!["C"]);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "");

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.tenant, "Default");
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "tenant: [unclosed");

        let err = load_merged_config(temp.path()).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigParseError { .. }));
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "recipe_paths: 42\n");

        let err = load_merged_config(temp.path()).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigParseError { .. }));
    }

    #[test]
    fn override_loads_single_file() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "config.yml", "tenant: Ignored\n");
        let other = temp.path().join("other.yml");
        fs::write(&other, "tenant: Chosen\n").unwrap();

        let config = load_config(temp.path(), Some(other.as_path())).unwrap();
        assert_eq!(config.tenant, "Chosen");
    }

    #[test]
    fn missing_override_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");
        let err = load_config(temp.path(), Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, RecipeError::Io(_)));
    }

    #[test]
    fn find_project_root_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }
}
