use serde::Serialize;
use serde_json::{Map, Value};

use super::format::toml_compatible;
use super::record::{ServerRecord, ValidationError, RECOGNIZED_FIELDS};
use super::registry::{Constraint, FileFormat, TargetSpec};
use super::source::SourceConfig;

/// Result of converting one record for one target
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    Native(Value),
    Rejected(String),
}

/// Source entry that a target does not accept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Convert a record into the target's native shape
pub fn transform_record(record: &ServerRecord, spec: &TargetSpec) -> Transformed {
    let transport = record.transport();
    if !spec.constraint.allows(transport) {
        return Transformed::Rejected(format!(
            "{} only supports {} transport, got {transport}",
            spec.display_name,
            allowed_list(spec)
        ));
    }

    let Value::Object(source) = record.to_value() else {
        return Transformed::Rejected("record did not serialize to an object".into());
    };

    let mut out = Map::new();
    for (src, dst) in spec.field_mapping {
        let Some(value) = source.get(*src) else {
            continue;
        };
        let dst = if *src == "url" {
            spec.url_field_for(transport).unwrap_or(*dst)
        } else {
            *dst
        };
        out.insert(dst.to_string(), value.clone());
    }

    // the url override applies even when the mapping itself does not list `url`
    if spec.target_field("url").is_none() {
        if let (Some(url), Some(field)) = (source.get("url"), spec.url_field_for(transport)) {
            out.insert(field.to_string(), url.clone());
        }
    }

    if spec.pass_unmapped {
        for (key, value) in record.extra() {
            if spec.target_field(key).is_some() || out.contains_key(key) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
    }

    let native = Value::Object(out);
    if spec.format == FileFormat::Toml {
        return match toml_compatible(&native) {
            Some(clean) => {
                if clean != native {
                    log::warn!(
                        "Dropped values TOML cannot hold from MCP server '{}' for {}",
                        record.name(),
                        spec.display_name
                    );
                }
                Transformed::Native(clean)
            }
            None => Transformed::Rejected("record cannot be written as TOML".into()),
        };
    }
    Transformed::Native(native)
}

/// Invert `transform_record`: read a target-native entry back into a record
pub fn restore_record(
    name: &str,
    native: &Value,
    spec: &TargetSpec,
) -> Result<ServerRecord, ValidationError> {
    let Value::Object(entry) = native else {
        return Err(ValidationError::NotAnObject {
            name: name.to_string(),
        });
    };

    let mut source = Map::new();
    for (src, dst) in spec.field_mapping {
        if *src == "url" {
            continue;
        }
        if let Some(value) = entry.get(*dst) {
            source.insert((*src).to_string(), value.clone());
        }
    }

    // the URL may live under any of the fields this target uses for it
    let url_fields = spec
        .url_overrides
        .iter()
        .map(|(_, field)| *field)
        .chain(spec.target_field("url"));
    for field in url_fields {
        if let Some(url) = entry.get(field) {
            source.insert("url".into(), url.clone());
            break;
        }
    }

    if spec.pass_unmapped {
        for (key, value) in entry {
            let is_mapped_target = spec.field_mapping.iter().any(|(_, dst)| dst == key)
                || spec.url_overrides.iter().any(|(_, field)| field == key);
            if is_mapped_target || RECOGNIZED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            source.insert(key.clone(), value.clone());
        }
    }

    ServerRecord::from_value(name, &Value::Object(source))
}

/// Transform every source record for one target
pub fn transform_source(
    source: &SourceConfig,
    spec: &TargetSpec,
) -> (Map<String, Value>, Vec<SkippedEntry>) {
    let mut entries = Map::new();
    let mut skipped = Vec::new();
    for record in source.servers() {
        match transform_record(record, spec) {
            Transformed::Native(value) => {
                entries.insert(record.name().to_string(), value);
            }
            Transformed::Rejected(reason) => {
                log::info!(
                    "Skipping MCP server '{}' for {}: {reason}",
                    record.name(),
                    spec.display_name
                );
                skipped.push(SkippedEntry {
                    name: record.name().to_string(),
                    reason,
                });
            }
        }
    }
    (entries, skipped)
}

fn allowed_list(spec: &TargetSpec) -> String {
    match spec.constraint {
        Constraint::Any => "any".into(),
        Constraint::TransportIn(allowed) => allowed
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("/"),
    }
}
