//! Schema registry - embedded JSON schemas

use rust_embed::Embed;
use serde_json::Value;
use std::collections::HashMap;

use super::{DocumentKind, FieldIssue, ValidationError};

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Registry of JSON schemas for config documents
pub struct SchemaRegistry {
    schemas: HashMap<DocumentKind, String>,
}

impl SchemaRegistry {
    /// Create a new schema registry with embedded schemas
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        for kind in DocumentKind::all() {
            let filename = format!("{}.schema.json", kind.as_str());
            if let Some(file) = EmbeddedSchemas::get(&filename) {
                if let Ok(content) = std::str::from_utf8(&file.data) {
                    schemas.insert(*kind, content.to_string());
                }
            }
        }

        Self { schemas }
    }

    /// Get the JSON schema for a document kind
    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        self.schemas.get(&kind).map(|s| s.as_str())
    }

    pub fn has_schema(&self, kind: DocumentKind) -> bool {
        self.schemas.contains_key(&kind)
    }

    /// Check a document against the schema for its kind. Each violation
    /// becomes an error located at the offending value.
    pub fn validate(
        &self,
        kind: DocumentKind,
        document: &Value,
    ) -> Result<Vec<FieldIssue>, ValidationError> {
        let source = self
            .get(kind)
            .ok_or(ValidationError::MissingSchema { kind })?;

        let schema: Value =
            serde_json::from_str(source).map_err(|e| ValidationError::InvalidSchema {
                kind,
                message: e.to_string(),
            })?;

        let validator =
            jsonschema::validator_for(&schema).map_err(|e| ValidationError::InvalidSchema {
                kind,
                message: e.to_string(),
            })?;

        Ok(validator
            .iter_errors(document)
            .map(|error| FieldIssue::error(error.instance_path.to_string(), error.to_string()))
            .collect())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
