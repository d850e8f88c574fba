//! Recipe and recipe step models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Descriptive metadata of a recipe.
///
/// Every field is optional in a recipe document; missing or `null` values
/// fall back to empty strings, `false` and `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeMetadata {
    /// Recipe name, also denormalized onto every step.
    #[serde(alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,

    /// Human-readable description.
    #[serde(alias = "Description", deserialize_with = "null_as_default")]
    pub description: String,

    /// Recipe author.
    #[serde(alias = "Author", deserialize_with = "null_as_default")]
    pub author: String,

    /// Author or project web site.
    #[serde(
        alias = "WebSite",
        alias = "Website",
        alias = "webSite",
        deserialize_with = "null_as_default"
    )]
    pub website: String,

    /// Recipe version.
    #[serde(alias = "Version", deserialize_with = "null_as_default")]
    pub version: String,

    /// Whether the recipe is offered during tenant setup.
    #[serde(alias = "IsSetupRecipe", deserialize_with = "null_as_default")]
    pub is_setup_recipe: bool,

    /// When the recipe was exported, if it was produced by an export.
    #[serde(alias = "ExportUtc", skip_serializing_if = "Option::is_none")]
    pub export_utc: Option<DateTime<Utc>>,

    /// Free-text category.
    #[serde(alias = "Category", deserialize_with = "null_as_default")]
    pub category: String,

    /// Free-text tags.
    #[serde(alias = "Tags", deserialize_with = "null_as_default")]
    pub tags: String,
}

impl RecipeMetadata {
    /// Create metadata with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One named unit of provisioning work.
///
/// The serialized form is also the on-disk queue record:
/// `{"id", "recipeName", "name", "step"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    /// Unique within the owning recipe.
    pub id: String,

    /// Name of the owning recipe.
    #[serde(default)]
    pub recipe_name: String,

    /// Step type identifier (e.g. "Feature").
    pub name: String,

    /// Handler-specific payload, passed through untouched.
    #[serde(default)]
    pub step: Value,
}

impl RecipeStep {
    /// Create a step.
    pub fn new(
        id: impl Into<String>,
        recipe_name: impl Into<String>,
        name: impl Into<String>,
        step: Value,
    ) -> Self {
        Self {
            id: id.into(),
            recipe_name: recipe_name.into(),
            name: name.into(),
            step,
        }
    }
}

/// A named, ordered list of provisioning steps plus descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    /// Descriptive metadata.
    #[serde(flatten)]
    pub metadata: RecipeMetadata,

    /// Steps in document order.
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Build a recipe from `(name, payload)` pairs in document order.
    ///
    /// Step ids are assigned as `"1"`, `"2"`, ... and every step carries the
    /// recipe name.
    pub fn new<I, S>(metadata: RecipeMetadata, steps: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, (name, payload))| {
                RecipeStep::new((index + 1).to_string(), &metadata.name, name, payload)
            })
            .collect();

        Self { metadata, steps }
    }

    /// The recipe name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Whether the recipe has no steps at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
