//! Recipe document parsing.
//!
//! A recipe document is a key/value mapping (JSON or YAML). The `recipe` key
//! holds the metadata; every other top-level key is a step whose key is the
//! step name and whose value is the payload. Keys starting with `_` are
//! comments. A top-level `steps` array allows the same step name to appear
//! more than once:
//!
//! ```json
//! {
//!   "recipe": { "name": "Blog", "isSetupRecipe": true },
//!   "steps": [
//!     { "Feature": { "enable": ["Orchard.Blogs"] } },
//!     { "name": "Feature", "enable": ["Orchard.Comments"] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::model::{Recipe, RecipeMetadata};
use crate::error::{RecipeError, Result};

/// Top-level key holding recipe metadata (matched case-insensitively).
pub const METADATA_KEY: &str = "recipe";

/// Top-level key whose array value expands into one step per element.
pub const STEPS_KEY: &str = "steps";

/// Serialization format of a recipe document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeFormat {
    Json,
    Yaml,
}

impl RecipeFormat {
    /// Pick the format from a file extension; anything but YAML is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Converts recipe documents into [`Recipe`]s.
pub struct RecipeParser;

impl RecipeParser {
    /// Parse recipe text.
    ///
    /// `source_name` is only used in error messages.
    pub fn parse(content: &str, format: RecipeFormat, source_name: &str) -> Result<Recipe> {
        let document: Value = match format {
            RecipeFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(source_name, e))?
            }
            RecipeFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_error(source_name, e))?
            }
        };

        Self::parse_value(document, source_name)
    }

    /// Parse an already-deserialized recipe document.
    pub fn parse_value(document: Value, source_name: &str) -> Result<Recipe> {
        let entries = match document {
            Value::Object(entries) => entries,
            other => {
                return Err(parse_error(
                    source_name,
                    format!(
                        "recipe document must be a key/value mapping, found {}",
                        kind_of(&other)
                    ),
                ))
            }
        };

        let mut metadata = RecipeMetadata::default();
        let mut steps: Vec<(String, Value)> = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            if key.eq_ignore_ascii_case(METADATA_KEY) {
                metadata = serde_json::from_value(value).map_err(|e| {
                    parse_error(source_name, format!("invalid recipe metadata: {}", e))
                })?;
                continue;
            }

            if key.starts_with('_') {
                continue;
            }

            match value {
                Value::Array(items) if key == STEPS_KEY => {
                    for (index, item) in items.into_iter().enumerate() {
                        steps.push(step_entry(item, index, source_name)?);
                    }
                }
                value => steps.push((key, value)),
            }
        }

        Ok(Recipe::new(metadata, steps))
    }

    /// Read and parse a recipe file, choosing the format from its extension.
    pub fn parse_file(path: &Path) -> Result<Recipe> {
        let content = fs::read_to_string(path)?;
        Self::parse(
            &content,
            RecipeFormat::from_path(path),
            &path.display().to_string(),
        )
    }
}

fn step_entry(item: Value, index: usize, source_name: &str) -> Result<(String, Value)> {
    let map: Map<String, Value> = match item {
        Value::Object(map) => map,
        other => {
            return Err(parse_error(
                source_name,
                format!(
                    "entry #{} of '{}' must be a mapping, found {}",
                    index + 1,
                    STEPS_KEY,
                    kind_of(&other)
                ),
            ))
        }
    };

    if let Some(name) = map.get("name").and_then(Value::as_str) {
        let name = name.to_string();
        return Ok((name, Value::Object(map)));
    }

    if map.len() == 1 {
        if let Some((name, payload)) = map.into_iter().next() {
            return Ok((name, payload));
        }
    }

    Err(parse_error(
        source_name,
        format!(
            "entry #{} of '{}' needs a 'name' field or exactly one key",
            index + 1,
            STEPS_KEY
        ),
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

fn parse_error(source_name: &str, message: impl ToString) -> RecipeError {
    RecipeError::RecipeParse {
        source_name: source_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse_json(text: &str) -> Result<Recipe> {
        RecipeParser::parse(text, RecipeFormat::Json, "test.recipe.json")
    }

    #[test]
    fn parsing_recipe_yields_unique_sequential_ids() {
        let recipe = parse_json(r#"{ "Bar": {}, "Baz": {}, "Qux": {} }"#).unwrap();

        let ids: Vec<_> = recipe.steps.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn steps_keep_document_order() {
        let recipe = parse_json(r#"{ "Zeta": 1, "Alpha": 2, "Mid": 3 }"#).unwrap();
        let names: Vec<_> = recipe.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn metadata_is_read_from_recipe_node() {
        let recipe = parse_json(
            r#"{
                "Recipe": {
                    "Name": "Agency",
                    "Description": "Agency theme and content",
                    "Author": "The Orchard Team",
                    "WebSite": "https://orchardproject.net",
                    "Version": "2.0",
                    "IsSetupRecipe": true,
                    "ExportUtc": "2016-02-01T10:00:00Z",
                    "Category": "default",
                    "Tags": "agency, theme"
                },
                "Feature": { "enable": ["TheAgencyTheme"] }
            }"#,
        )
        .unwrap();

        let meta = &recipe.metadata;
        assert_eq!(meta.name, "Agency");
        assert_eq!(meta.author, "The Orchard Team");
        assert_eq!(meta.website, "https://orchardproject.net");
        assert_eq!(meta.version, "2.0");
        assert!(meta.is_setup_recipe);
        assert!(meta.export_utc.is_some());
        assert_eq!(meta.category, "default");
        assert_eq!(meta.tags, "agency, theme");

        assert_eq!(recipe.steps.len(), 1);
        assert_eq!(recipe.steps[0].recipe_name, "Agency");
    }

    #[test]
    fn metadata_defaults_when_missing() {
        let recipe = parse_json(r#"{ "Feature": {} }"#).unwrap();
        assert_eq!(recipe.metadata, RecipeMetadata::default());
        assert_eq!(recipe.steps[0].recipe_name, "");
    }

    #[test]
    fn metadata_after_steps_still_names_steps() {
        let recipe = parse_json(r#"{ "Feature": {}, "recipe": { "name": "Late" } }"#).unwrap();
        assert_eq!(recipe.steps[0].recipe_name, "Late");
    }

    #[test]
    fn payload_is_passed_through_verbatim() {
        let recipe =
            parse_json(r#"{ "Content": { "data": [{ "type": "Page", "title": "Home" }] } }"#)
                .unwrap();
        assert_eq!(
            recipe.steps[0].step,
            json!({ "data": [{ "type": "Page", "title": "Home" }] })
        );
    }

    #[test]
    fn comment_keys_are_skipped() {
        let recipe =
            parse_json(r#"{ "_comment": "Exported from Orchard", "Feature": {} }"#).unwrap();
        assert_eq!(recipe.steps.len(), 1);
        assert_eq!(recipe.steps[0].name, "Feature");
    }

    #[test]
    fn steps_array_allows_repeated_names() {
        let recipe = parse_json(
            r#"{
                "recipe": { "name": "Default" },
                "Settings": { "siteName": "Orchard" },
                "steps": [
                    { "Feature": { "enable": ["A"] } },
                    { "name": "Feature", "enable": ["B"] }
                ],
                "Content": {}
            }"#,
        )
        .unwrap();

        let names: Vec<_> = recipe.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Settings", "Feature", "Feature", "Content"]);
        assert_eq!(recipe.steps[1].step, json!({ "enable": ["A"] }));
        assert_eq!(recipe.steps[2].step["enable"], json!(["B"]));
        assert_eq!(recipe.steps[3].id, "4");
    }

    #[test]
    fn steps_entry_without_name_is_rejected() {
        let err = parse_json(r#"{ "steps": [ { "a": 1, "b": 2 } ] }"#).unwrap_err();
        assert!(matches!(err, RecipeError::RecipeParse { .. }));
        assert!(err.to_string().contains("entry #1"));
    }

    #[test]
    fn steps_entry_must_be_mapping() {
        let err = parse_json(r#"{ "steps": [ "Feature" ] }"#).unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_json(r#"{ "Feature": "#).unwrap_err();
        match err {
            RecipeError::RecipeParse { source_name, .. } => {
                assert_eq!(source_name, "test.recipe.json")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn non_mapping_root_is_a_parse_error() {
        let err = parse_json(r#"[ { "Feature": {} } ]"#).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn invalid_metadata_is_a_parse_error() {
        let err = parse_json(r#"{ "recipe": "Blog" }"#).unwrap_err();
        assert!(err.to_string().contains("invalid recipe metadata"));
    }

    #[test]
    fn yaml_recipes_are_supported() {
        let recipe = RecipeParser::parse(
            "recipe:\n  name: Blog\nFeature:\n  enable: [Orchard.Blogs]\nContent: {}\n",
            RecipeFormat::Yaml,
            "blog.recipe.yml",
        )
        .unwrap();

        assert_eq!(recipe.name(), "Blog");
        assert_eq!(recipe.steps.len(), 2);
        assert_eq!(recipe.steps[0].step, json!({ "enable": ["Orchard.Blogs"] }));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            RecipeFormat::from_path(&PathBuf::from("a.recipe.yml")),
            RecipeFormat::Yaml
        );
        assert_eq!(
            RecipeFormat::from_path(&PathBuf::from("a.recipe.YAML")),
            RecipeFormat::Yaml
        );
        assert_eq!(
            RecipeFormat::from_path(&PathBuf::from("a.recipe.json")),
            RecipeFormat::Json
        );
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blog.recipe.json");
        fs::write(&path, r#"{ "recipe": { "name": "Blog" }, "Feature": {} }"#).unwrap();

        let recipe = RecipeParser::parse_file(&path).unwrap();
        assert_eq!(recipe.name(), "Blog");
    }

    #[test]
    fn parse_file_missing_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = RecipeParser::parse_file(&temp.path().join("missing.recipe.json")).unwrap_err();
        assert!(matches!(err, RecipeError::Io(_)));
    }
}
