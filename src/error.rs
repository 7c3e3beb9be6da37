use std::path::Path;

use thiserror::Error;

use crate::mcp::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Source config not found: {0}")]
    SourceNotFound(String),
    #[error("Failed to read source config {path}: {source}")]
    SourceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid source config {path}: {message}")]
    SourceParse { path: String, message: String },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unexpected document layout in {path}: {reason}")]
    InvalidDocument { path: String, reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to back up {path}: {source}")]
    BackupFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize JSON: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn toml(path: impl AsRef<Path>, source: toml::de::Error) -> Self {
        Self::Toml {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn invalid_document(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Stable label used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::SourceNotFound(_) => "source-not-found",
            AppError::SourceRead { .. } | AppError::SourceParse { .. } => "source-parse-error",
            AppError::Json { .. } | AppError::Toml { .. } | AppError::InvalidDocument { .. } => {
                "format-parse-error"
            }
            AppError::Validation(_) => "validation-error",
            AppError::BackupFailed { .. } | AppError::Io { .. } | AppError::IoContext { .. } => {
                "write-failure"
            }
            AppError::JsonSerialize { .. } => "serialize-error",
            AppError::Config(_) => "config-error",
            AppError::InvalidInput(_) => "invalid-input",
        }
    }

    /// Source-level failures abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::SourceNotFound(_) | AppError::SourceRead { .. } | AppError::SourceParse { .. }
        )
    }
}
