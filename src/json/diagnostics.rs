//! Diagnostics for malformed config files
//!
//! serde_json reports a 1-based line and column; these are turned into a byte
//! span so miette can point at the offending character.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors reading or parsing a JSON file
#[derive(Debug, Error, Diagnostic)]
pub enum JsonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(eoscfg::json::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parse or shape error with its location in the source
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid JSON in {filename}: {message}")]
#[diagnostic(
    code(eoscfg::json::syntax),
    help("Fix the file by hand, or delete it and run `eoscfg init` to start over")
)]
pub struct JsonSyntaxError {
    pub filename: String,
    pub message: String,
    pub line: usize,
    pub column: usize,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,
}

impl JsonSyntaxError {
    pub fn from_serde_error(error: &serde_json::Error, content: &str, filename: &str) -> Self {
        let line = error.line();
        let column = error.column();
        let span = offset_of(content, line, column).map(|offset| SourceSpan::from((offset, 1)));

        Self {
            filename: filename.to_string(),
            message: strip_location(&error.to_string()),
            line,
            column,
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

/// Byte offset of a 1-based line/column pair, clamped to the content
fn offset_of(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || content.is_empty() {
        return None;
    }

    let mut offset = 0;
    for (index, text) in content.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let within = column.saturating_sub(1).min(text.len().saturating_sub(1));
            return Some(offset + within);
        }
        offset += text.len();
    }

    Some(content.len() - 1)
}

/// serde_json appends " at line X column Y", which the label already shows
fn strip_location(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(pos) => message[..pos].to_string(),
        None => message.to_string(),
    }
}
