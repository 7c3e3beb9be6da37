use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;

use super::record::TransportType;

/// On-disk format of a target config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Toml,
}

/// Which source records a target accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Any,
    TransportIn(&'static [TransportType]),
}

impl Constraint {
    pub fn allows(&self, transport: TransportType) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::TransportIn(allowed) => allowed.contains(&transport),
        }
    }
}

/// Static description of one consumer tool
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub path: PathBuf,
    pub format: FileFormat,
    pub top_level_key: &'static str,
    /// (source field, target field), applied in this order
    pub field_mapping: &'static [(&'static str, &'static str)],
    /// Copy fields not named in `field_mapping` unchanged
    pub pass_unmapped: bool,
    pub constraint: Constraint,
    /// Per-transport target field for `url`, overriding `field_mapping`
    pub url_overrides: &'static [(TransportType, &'static str)],
}

impl TargetSpec {
    /// Target field name for a source field, if the mapping carries it
    pub fn target_field(&self, source_field: &str) -> Option<&'static str> {
        self.field_mapping
            .iter()
            .find(|(src, _)| *src == source_field)
            .map(|(_, dst)| *dst)
    }

    pub fn url_field_for(&self, transport: TransportType) -> Option<&'static str> {
        self.url_overrides
            .iter()
            .find(|(t, _)| *t == transport)
            .map(|(_, field)| *field)
            .or_else(|| self.target_field("url"))
    }
}

const IDENTITY_MAPPING: &[(&str, &str)] = &[
    ("type", "type"),
    ("command", "command"),
    ("args", "args"),
    ("url", "url"),
    ("env", "env"),
];

/// Codex only understands a fixed set of keys in `[mcp_servers.<name>]`
const CODEX_MAPPING: &[(&str, &str)] = &[
    ("type", "type"),
    ("command", "command"),
    ("args", "args"),
    ("env", "env"),
    ("cwd", "cwd"),
    ("env_vars", "env_vars"),
    ("enabled", "enabled"),
    ("startup_timeout_sec", "startup_timeout_sec"),
    ("startup_timeout_ms", "startup_timeout_ms"),
    ("tool_timeout_sec", "tool_timeout_sec"),
    ("enabled_tools", "enabled_tools"),
    ("disabled_tools", "disabled_tools"),
];

/// Gemini infers the transport from the key: `httpUrl` for streamable HTTP, `url` for SSE
const GEMINI_URL_OVERRIDES: &[(TransportType, &str)] = &[(TransportType::Http, "httpUrl")];

const STDIO_ONLY: &[TransportType] = &[TransportType::Stdio];

/// Registered targets, in processing order
pub fn default_targets(home: &Path, vscode_flavor: &str) -> Vec<TargetSpec> {
    vec![
        TargetSpec {
            id: "claude",
            display_name: "Claude Code",
            path: home.join(".claude.json"),
            format: FileFormat::Json,
            top_level_key: "mcpServers",
            field_mapping: IDENTITY_MAPPING,
            pass_unmapped: true,
            constraint: Constraint::Any,
            url_overrides: &[],
        },
        TargetSpec {
            id: "gemini",
            display_name: "Gemini CLI",
            path: home.join(".gemini").join("settings.json"),
            format: FileFormat::Json,
            top_level_key: "mcpServers",
            field_mapping: IDENTITY_MAPPING,
            pass_unmapped: true,
            constraint: Constraint::Any,
            url_overrides: GEMINI_URL_OVERRIDES,
        },
        TargetSpec {
            id: "vscode",
            display_name: "GitHub Copilot in VS Code",
            path: home
                .join(".config")
                .join(vscode_flavor)
                .join("User")
                .join("mcp.json"),
            format: FileFormat::Json,
            top_level_key: "servers",
            field_mapping: IDENTITY_MAPPING,
            pass_unmapped: true,
            constraint: Constraint::Any,
            url_overrides: &[],
        },
        TargetSpec {
            id: "vscode-remote",
            display_name: "GitHub Copilot in VS Code (Remote/WSL)",
            path: home
                .join(".vscode-server")
                .join("data")
                .join("User")
                .join("mcp.json"),
            format: FileFormat::Json,
            top_level_key: "servers",
            field_mapping: IDENTITY_MAPPING,
            pass_unmapped: true,
            constraint: Constraint::Any,
            url_overrides: &[],
        },
        TargetSpec {
            id: "codex",
            display_name: "OpenAI Codex CLI",
            path: home.join(".codex").join("config.toml"),
            format: FileFormat::Toml,
            top_level_key: "mcp_servers",
            field_mapping: CODEX_MAPPING,
            pass_unmapped: false,
            constraint: Constraint::TransportIn(STDIO_ONLY),
            url_overrides: &[],
        },
    ]
}

/// Keep only the targets named in `only` (all of them when `only` is empty)
pub fn select_targets(
    targets: Vec<TargetSpec>,
    only: &[String],
) -> Result<Vec<TargetSpec>, AppError> {
    if only.is_empty() {
        return Ok(targets);
    }

    let wanted: Vec<String> = only.iter().map(|s| s.trim().to_lowercase()).collect();
    if let Some(unknown) = wanted
        .iter()
        .find(|id| !targets.iter().any(|t| t.id == id.as_str()))
    {
        let known: Vec<_> = targets.iter().map(|t| t.id).collect();
        return Err(AppError::InvalidInput(format!(
            "Unknown target '{unknown}'. Allowed: {}.",
            known.join(", ")
        )));
    }

    Ok(targets
        .into_iter()
        .filter(|t| wanted.iter().any(|id| id == t.id))
        .collect())
}
