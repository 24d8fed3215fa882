//! JSON parsing with error handling

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::json::diagnostics::{JsonError, JsonSyntaxError};

/// Parse JSON content into a typed value with nice error messages
pub fn parse_json<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, JsonError> {
    serde_json::from_str(content)
        .map_err(|e| JsonError::Syntax(JsonSyntaxError::from_serde_error(&e, content, filename)))
}

/// Parse JSON from a file path
pub fn parse_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, JsonError> {
    let content = std::fs::read_to_string(path).map_err(|source| JsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.display().to_string();
    parse_json(&content, &filename)
}

/// Pretty JSON with a trailing newline, the layout config files are written in
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    Ok(content)
}
