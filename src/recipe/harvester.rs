//! Recipe discovery in configured directories.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::model::Recipe;
use super::parser::RecipeParser;
use crate::error::Result;

const RECIPE_SUFFIXES: &[&str] = &[".recipe.json", ".recipe.yml", ".recipe.yaml"];

/// A recipe found on disk.
#[derive(Debug, Clone)]
pub struct HarvestedRecipe {
    /// File the recipe was read from.
    pub path: PathBuf,
    /// The parsed recipe.
    pub recipe: Recipe,
}

/// Finds `*.recipe.json` / `*.recipe.yml` files under a set of directories.
#[derive(Debug, Clone, Default)]
pub struct RecipeHarvester {
    paths: Vec<PathBuf>,
}

impl RecipeHarvester {
    /// Create a harvester over the given directories.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Directories searched.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Parse every recipe file below the configured directories.
    ///
    /// Files that fail to parse are logged and skipped. Missing directories
    /// are ignored.
    pub fn harvest(&self) -> Result<Vec<HarvestedRecipe>> {
        let mut files = Vec::new();
        for dir in &self.paths {
            collect_recipe_files(dir, &mut files)?;
        }
        files.sort();

        let mut recipes = Vec::with_capacity(files.len());
        for path in files {
            match RecipeParser::parse_file(&path) {
                Ok(recipe) => {
                    debug!("Harvested recipe '{}' from {}", recipe.name(), path.display());
                    recipes.push(HarvestedRecipe { path, recipe });
                }
                Err(e) => {
                    error!("Could not parse recipe file {}: {}", path.display(), e);
                }
            }
        }

        Ok(recipes)
    }

    /// Find a recipe by name (case-insensitive).
    pub fn find_recipe(&self, name: &str) -> Result<Option<HarvestedRecipe>> {
        Ok(self
            .harvest()?
            .into_iter()
            .find(|h| h.recipe.name().eq_ignore_ascii_case(name)))
    }

    /// Recipes flagged as setup recipes.
    pub fn setup_recipes(&self) -> Result<Vec<HarvestedRecipe>> {
        Ok(self
            .harvest()?
            .into_iter()
            .filter(|h| h.recipe.metadata.is_setup_recipe)
            .collect())
    }
}

/// Whether a file name looks like a recipe document.
pub fn is_recipe_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            let lower = name.to_ascii_lowercase();
            RECIPE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .unwrap_or(false)
}

fn collect_recipe_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_recipe_files(&path, files)?;
        } else if is_recipe_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}
