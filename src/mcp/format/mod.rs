//! Target file adapters.
//!
//! Each target file is split into the entry section under its top-level key,
//! which the merge engine works on as JSON values, and the rest of the file,
//! which is written back untouched.

mod json_doc;
mod toml_doc;

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::AppError;

use super::merge::MergeOutcome;
use super::registry::FileFormat;

pub use toml_doc::toml_compatible;

#[derive(Debug)]
enum DocumentBody {
    Json(Map<String, Value>),
    Toml(toml_edit::DocumentMut),
}

/// Parsed contents of one target file
#[derive(Debug)]
pub struct TargetDocument {
    entries: Map<String, Value>,
    body: DocumentBody,
}

impl TargetDocument {
    /// Fresh document for a file that does not exist yet
    pub fn empty(format: FileFormat) -> Self {
        let body = match format {
            FileFormat::Json => DocumentBody::Json(Map::new()),
            FileFormat::Toml => DocumentBody::Toml(toml_edit::DocumentMut::new()),
        };
        Self {
            entries: Map::new(),
            body,
        }
    }

    pub fn format(&self) -> FileFormat {
        match self.body {
            DocumentBody::Json(_) => FileFormat::Json,
            DocumentBody::Toml(_) => FileFormat::Toml,
        }
    }

    /// Entries under the top-level key, in file order
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Replace the entry section with a merge result
    pub fn apply(&mut self, key: &str, outcome: &MergeOutcome) -> Result<(), AppError> {
        match &mut self.body {
            DocumentBody::Json(root) => json_doc::apply(root, key, outcome),
            DocumentBody::Toml(doc) => toml_doc::apply(doc, key, outcome)?,
        }
        self.entries = outcome.entries.clone();
        Ok(())
    }

    pub fn render(&self) -> Result<String, AppError> {
        match &self.body {
            DocumentBody::Json(root) => json_doc::render(root),
            DocumentBody::Toml(doc) => Ok(doc.to_string()),
        }
    }
}

/// Read a target file; `Ok(None)` when it does not exist
pub fn read_document(
    format: FileFormat,
    path: &Path,
    key: &str,
) -> Result<Option<TargetDocument>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let doc = match format {
        FileFormat::Json => json_doc::parse(path, &text, key)?,
        FileFormat::Toml => toml_doc::parse(path, &text, key)?,
    };
    Ok(Some(doc))
}
