use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Field names the record model understands; everything else is carried in `extra`
pub const RECOGNIZED_FIELDS: [&str; 5] = ["type", "command", "args", "url", "env"];

/// Connection mechanism of an MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Stdio,
    Http,
    Sse,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Stdio => "stdio",
            TransportType::Http => "http",
            TransportType::Sse => "sse",
        }
    }

    /// Field that must be present for this transport
    fn required_field(&self) -> &'static str {
        match self {
            TransportType::Stdio => "command",
            TransportType::Http | TransportType::Sse => "url",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportType::Stdio),
            "http" => Ok(TransportType::Http),
            "sse" => Ok(TransportType::Sse),
            other => Err(format!(
                "Unsupported transport type '{other}'. Allowed: stdio, http, sse."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("MCP server '{name}' must be a JSON object")]
    NotAnObject { name: String },
    #[error("MCP server '{name}' has unknown transport type '{value}' (expected stdio, http or sse)")]
    UnknownTransport { name: String, value: String },
    #[error("MCP server '{name}' of type {transport} is missing field '{field}'")]
    MissingField {
        name: String,
        field: &'static str,
        transport: TransportType,
    },
    #[error("MCP server '{name}' has a malformed field: {reason}")]
    InvalidField { name: String, reason: String },
}

/// Shape of a server entry before validation
#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "type", default)]
    transport: Option<Value>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    env: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// One MCP server definition.
///
/// `args` and `env` remember whether they were present at all, so an empty
/// list written by the user survives a round trip. Unrecognized fields are
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRecord {
    name: String,
    transport: TransportType,
    declared_type: bool,
    command: Option<String>,
    args: Option<Vec<String>>,
    url: Option<String>,
    env: Option<IndexMap<String, String>>,
    extra: Map<String, Value>,
}

impl ServerRecord {
    /// Build a record from an untyped entry.
    ///
    /// A missing `type` means stdio, the convention shared by Claude Code and
    /// the other clients.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::NotAnObject {
                name: name.to_string(),
            });
        }

        let raw: RawRecord =
            serde_json::from_value(value.clone()).map_err(|e| ValidationError::InvalidField {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let (transport, declared_type) = match &raw.transport {
            None => (TransportType::Stdio, false),
            Some(Value::String(s)) => {
                let t = s
                    .parse::<TransportType>()
                    .map_err(|_| ValidationError::UnknownTransport {
                        name: name.to_string(),
                        value: s.clone(),
                    })?;
                (t, true)
            }
            Some(other) => {
                return Err(ValidationError::UnknownTransport {
                    name: name.to_string(),
                    value: other.to_string(),
                })
            }
        };

        let required = match transport {
            TransportType::Stdio => raw.command.as_deref(),
            TransportType::Http | TransportType::Sse => raw.url.as_deref(),
        };
        if required.map(str::trim).unwrap_or("").is_empty() {
            return Err(ValidationError::MissingField {
                name: name.to_string(),
                field: transport.required_field(),
                transport,
            });
        }

        Ok(Self {
            name: name.to_string(),
            transport,
            declared_type,
            command: raw.command,
            args: raw.args,
            url: raw.url,
            env: raw.env,
            extra: raw.extra,
        })
    }

    pub fn stdio(name: &str, command: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            transport: TransportType::Stdio,
            declared_type: true,
            command: Some(command.to_string()),
            args: Some(args.iter().map(|a| a.to_string()).collect()),
            url: None,
            env: None,
            extra: Map::new(),
        }
    }

    pub fn remote(name: &str, transport: TransportType, url: &str) -> Self {
        Self {
            name: name.to_string(),
            transport,
            declared_type: true,
            command: None,
            args: None,
            url: Some(url.to_string()),
            env: None,
            extra: Map::new(),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env
            .get_or_insert_with(IndexMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> TransportType {
        self.transport
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn args(&self) -> &[String] {
        self.args.as_deref().unwrap_or(&[])
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn env(&self) -> Option<&IndexMap<String, String>> {
        self.env.as_ref()
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Untyped form: recognized fields first, then `extra` in its original order
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if self.declared_type {
            obj.insert("type".into(), json!(self.transport.as_str()));
        }
        if let Some(cmd) = &self.command {
            obj.insert("command".into(), json!(cmd));
        }
        if let Some(args) = &self.args {
            obj.insert("args".into(), json!(args));
        }
        if let Some(url) = &self.url {
            obj.insert("url".into(), json!(url));
        }
        if let Some(env) = &self.env {
            let env_obj: Map<String, Value> =
                env.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            obj.insert("env".into(), Value::Object(env_obj));
        }
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}
