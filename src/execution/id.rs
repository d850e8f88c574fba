//! Execution ID generation and parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{RecipeError, Result};

/// Identifies one run of one recipe.
///
/// Generated ids are UUID v4 values rendered as 32 lowercase hex characters.
/// Parsed ids only need to be usable as a directory name: non-empty ASCII
/// alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Generate a new execution ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Parse an execution ID supplied from outside (CLI, task parameters).
    pub fn parse(s: &str) -> Result<Self> {
        let valid = !s.is_empty()
            && s.len() <= 128
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(RecipeError::InvalidExecutionId {
                value: s.to_string(),
            })
        }
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ExecutionId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ExecutionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ExecutionId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_hex() {
        let id1 = ExecutionId::new();
        let id2 = ExecutionId::new();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 32);
        assert!(id1
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parse_accepts_generated_ids() {
        let id = ExecutionId::new();
        assert_eq!(ExecutionId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn parse_accepts_safe_names() {
        assert!(ExecutionId::parse("setup-2024_01").is_ok());
    }

    #[test]
    fn parse_rejects_unsafe_values() {
        for value in ["", "..", "a/b", "a\\b", "with space", "é"] {
            let err = ExecutionId::parse(value).unwrap_err();
            assert!(matches!(err, RecipeError::InvalidExecutionId { .. }), "{value}");
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ExecutionId::parse("abc123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");

        let parsed: ExecutionId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<ExecutionId>("\"../etc\"").is_err());
    }
}
