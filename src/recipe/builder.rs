//! Recipe export.
//!
//! A [`RecipeBuilder`] runs a set of [`RecipeBuilderStep`]s, highest priority
//! first, each contributing top-level keys to a recipe document. The result
//! is a document [`RecipeParser`](super::parser::RecipeParser) reads back.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::model::RecipeMetadata;
use super::parser::METADATA_KEY;

/// Comment written at the top of every exported recipe.
pub const EXPORT_COMMENT: &str = "Exported from Orchard";

/// Contributes part of an exported recipe document.
pub trait RecipeBuilderStep: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Steps with higher priority run first.
    fn priority(&self) -> i32 {
        0
    }

    /// Add keys to the document root.
    fn build(&self, document: &mut Map<String, Value>);
}

/// Assembles an exported recipe document.
#[derive(Default)]
pub struct RecipeBuilder {
    steps: Vec<Box<dyn RecipeBuilderStep>>,
}

impl RecipeBuilder {
    /// Create a builder without steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a build step.
    pub fn add_step(&mut self, step: Box<dyn RecipeBuilderStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Number of build steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no build steps were added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Build the document, stamping it with `now` as the export time.
    pub fn build(&self, now: DateTime<Utc>) -> Value {
        let mut document = Map::new();
        document.insert("_comment".into(), Value::String(EXPORT_COMMENT.into()));

        let mut metadata = Map::new();
        metadata.insert(
            "exportUtc".into(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        document.insert(METADATA_KEY.into(), Value::Object(metadata));

        let mut ordered: Vec<&dyn RecipeBuilderStep> =
            self.steps.iter().map(|s| s.as_ref()).collect();
        ordered.sort_by_key(|s| std::cmp::Reverse(s.priority()));

        for step in ordered {
            tracing::debug!("Running recipe builder step '{}'", step.name());
            step.build(&mut document);
        }

        Value::Object(document)
    }
}

/// Writes descriptive metadata into the `recipe` node.
pub struct RecipeMetadataStep {
    metadata: RecipeMetadata,
}

impl RecipeMetadataStep {
    pub fn new(metadata: RecipeMetadata) -> Self {
        Self { metadata }
    }
}

impl RecipeBuilderStep for RecipeMetadataStep {
    fn name(&self) -> &str {
        "RecipeMetadata"
    }

    fn priority(&self) -> i32 {
        1000
    }

    fn build(&self, document: &mut Map<String, Value>) {
        let fields = match serde_json::to_value(&self.metadata) {
            Ok(Value::Object(fields)) => fields,
            _ => return,
        };

        let node = document
            .entry(METADATA_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(node) = node {
            for (key, value) in fields {
                // The export timestamp stamped by the builder wins.
                if key == "exportUtc" && node.contains_key(&key) {
                    continue;
                }
                node.insert(key, value);
            }
        }
    }
}

/// Exports the enabled feature list as a `Feature` step.
pub struct FeatureExportStep {
    features: Vec<String>,
}

impl FeatureExportStep {
    pub fn new(features: Vec<String>) -> Self {
        Self { features }
    }
}

impl RecipeBuilderStep for FeatureExportStep {
    fn name(&self) -> &str {
        "Feature"
    }

    fn build(&self, document: &mut Map<String, Value>) {
        if self.features.is_empty() {
            return;
        }

        let mut payload = Map::new();
        payload.insert(
            "enable".into(),
            Value::Array(self.features.iter().cloned().map(Value::String).collect()),
        );
        document.insert("Feature".into(), Value::Object(payload));
    }
}
