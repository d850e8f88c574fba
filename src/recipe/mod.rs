//! Recipes: the model, parsing, discovery and export.
//!
//! A recipe is an ordered list of named steps plus descriptive metadata.
//! [`RecipeParser`] turns documents into [`Recipe`]s, [`RecipeHarvester`]
//! finds recipe files on disk and [`RecipeBuilder`] exports a tenant back
//! into a recipe document.

pub mod builder;
pub mod harvester;
pub mod model;
pub mod parser;

pub use builder::{FeatureExportStep, RecipeBuilder, RecipeBuilderStep, RecipeMetadataStep};
pub use harvester::{HarvestedRecipe, RecipeHarvester};
pub use model::{Recipe, RecipeMetadata, RecipeStep};
pub use parser::{RecipeFormat, RecipeParser};
