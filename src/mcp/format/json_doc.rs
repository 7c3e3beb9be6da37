use std::path::Path;

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::mcp::merge::MergeOutcome;

use super::{DocumentBody, TargetDocument};

pub(super) fn parse(path: &Path, text: &str, key: &str) -> Result<TargetDocument, AppError> {
    // a zero-byte settings file is common right after a tool is installed
    if text.trim().is_empty() {
        return Ok(TargetDocument {
            entries: Map::new(),
            body: DocumentBody::Json(Map::new()),
        });
    }

    let value: Value = serde_json::from_str(text).map_err(|e| AppError::json(path, e))?;
    let Value::Object(root) = value else {
        return Err(AppError::invalid_document(
            path,
            "root must be a JSON object",
        ));
    };

    let entries = match root.get(key) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(AppError::invalid_document(
                path,
                format!("'{key}' must be a JSON object"),
            ))
        }
    };

    Ok(TargetDocument {
        entries,
        body: DocumentBody::Json(root),
    })
}

/// Only the top-level key is replaced; an existing key keeps its position
pub(super) fn apply(root: &mut Map<String, Value>, key: &str, outcome: &MergeOutcome) {
    root.insert(key.to_string(), Value::Object(outcome.entries.clone()));
}

pub(super) fn render(root: &Map<String, Value>) -> Result<String, AppError> {
    let mut text =
        serde_json::to_string_pretty(root).map_err(|e| AppError::JsonSerialize { source: e })?;
    text.push('\n');
    Ok(text)
}
