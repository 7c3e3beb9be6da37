use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{expand_tilde, get_home_dir};
use crate::error::AppError;

use super::record::{ServerRecord, ValidationError};

/// The only key read from the source file; sibling sections such as
/// project-scoped `projects` are never looked at
pub const SOURCE_KEY: &str = "mcpServers";

/// User-scoped servers loaded from the authoritative file
#[derive(Debug, Clone)]
pub struct SourceConfig {
    path: PathBuf,
    servers: Vec<ServerRecord>,
    invalid: Vec<(String, ValidationError)>,
}

impl SourceConfig {
    pub fn from_records(path: impl Into<PathBuf>, servers: Vec<ServerRecord>) -> Self {
        Self {
            path: path.into(),
            servers,
            invalid: Vec::new(),
        }
    }

    /// Canonical path of the source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Servers in source file order
    pub fn servers(&self) -> &[ServerRecord] {
        &self.servers
    }

    /// Entries dropped because they failed validation
    pub fn invalid(&self) -> &[(String, ValidationError)] {
        &self.invalid
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Whether `candidate` resolves to the source file itself
    pub fn is_same_file(&self, candidate: &Path) -> bool {
        match fs::canonicalize(candidate) {
            Ok(resolved) => resolved == self.path,
            Err(_) => false,
        }
    }
}

/// Load and validate the source file
pub fn load_source(path: &Path) -> Result<SourceConfig, AppError> {
    let expanded = if path.starts_with("~") {
        expand_tilde(path, &get_home_dir()?)
    } else {
        path.to_path_buf()
    };
    if !expanded.is_file() {
        return Err(AppError::SourceNotFound(expanded.display().to_string()));
    }
    let canonical = fs::canonicalize(&expanded).map_err(|e| AppError::SourceRead {
        path: expanded.display().to_string(),
        source: e,
    })?;

    let text = fs::read_to_string(&canonical).map_err(|e| AppError::SourceRead {
        path: canonical.display().to_string(),
        source: e,
    })?;
    let root: Value = serde_json::from_str(&text).map_err(|e| AppError::SourceParse {
        path: canonical.display().to_string(),
        message: e.to_string(),
    })?;
    let Some(root) = root.as_object() else {
        return Err(AppError::SourceParse {
            path: canonical.display().to_string(),
            message: "root must be a JSON object".into(),
        });
    };

    let entries = match root.get(SOURCE_KEY) {
        None | Some(Value::Null) => {
            log::info!(
                "No '{SOURCE_KEY}' key in {}, nothing to sync",
                canonical.display()
            );
            return Ok(SourceConfig::from_records(canonical, Vec::new()));
        }
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::SourceParse {
                path: canonical.display().to_string(),
                message: format!("'{SOURCE_KEY}' must be a JSON object"),
            })
        }
    };

    let mut servers = Vec::with_capacity(entries.len());
    let mut invalid = Vec::new();
    for (name, spec) in entries {
        // a bad entry is skipped, the rest still syncs
        match ServerRecord::from_value(name, spec) {
            Ok(record) => servers.push(record),
            Err(e) => {
                log::warn!("Skipping invalid MCP server '{name}': {e}");
                invalid.push((name.clone(), e));
            }
        }
    }

    log::info!(
        "Loaded {} MCP server(s) from {}",
        servers.len(),
        canonical.display()
    );

    Ok(SourceConfig {
        path: canonical,
        servers,
        invalid,
    })
}
