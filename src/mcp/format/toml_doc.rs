use std::collections::HashSet;
use std::path::Path;

use serde_json::{json, Map, Value};
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table};

use crate::error::AppError;
use crate::mcp::merge::{ChangeKind, MergeOutcome};

use super::{DocumentBody, TargetDocument};

pub(super) fn parse(path: &Path, text: &str, key: &str) -> Result<TargetDocument, AppError> {
    // `toml` gives plain values for comparison, `toml_edit` keeps the layout for writing
    let table: toml::Table = toml::from_str(text).map_err(|e| AppError::toml(path, e))?;
    let doc = text
        .parse::<DocumentMut>()
        .map_err(|e| AppError::invalid_document(path, e.to_string()))?;

    let entries = match table.get(key) {
        None => Map::new(),
        Some(toml::Value::Table(servers)) => servers
            .iter()
            .map(|(name, v)| (name.clone(), toml_to_json(v)))
            .collect(),
        Some(_) => {
            return Err(AppError::invalid_document(
                path,
                format!("'{key}' must be a table"),
            ))
        }
    };

    Ok(TargetDocument {
        entries,
        body: DocumentBody::Toml(doc),
    })
}

/// Rewrite only the entries the merge touched; untouched servers keep their formatting
pub(super) fn apply(
    doc: &mut DocumentMut,
    key: &str,
    outcome: &MergeOutcome,
) -> Result<(), AppError> {
    let root = doc.as_table_mut();

    // `mcp_servers = { ... }` style sections cannot hold subtables, rebuild them
    let rebuild = root.get(key).is_some_and(|item| !item.is_table());
    if rebuild {
        log::debug!("Rebuilding inline '{key}' section as a table");
        root.remove(key);
    }
    if !root.contains_key(key) {
        let mut servers = Table::new();
        servers.set_implicit(true);
        root.insert(key, Item::Table(servers));
    }
    let servers = root
        .get_mut(key)
        .and_then(Item::as_table_mut)
        .ok_or_else(|| AppError::Config(format!("'{key}' is not a TOML table")))?;

    let touched: HashSet<&str> = outcome
        .changes
        .iter()
        .filter(|c| matches!(c.kind, ChangeKind::Added | ChangeKind::Updated))
        .map(|c| c.name.as_str())
        .collect();

    // a rebuilt section starts empty, so every kept entry goes back in
    for (name, value) in &outcome.entries {
        if rebuild || touched.contains(name.as_str()) {
            match entry_item(value) {
                Some(item) => {
                    servers.insert(name, item);
                }
                None => log::warn!("Skipping MCP server '{name}': value cannot be written as TOML"),
            }
        }
    }
    for change in &outcome.changes {
        if change.kind == ChangeKind::Removed {
            servers.remove(&change.name);
        }
    }
    Ok(())
}

fn entry_item(value: &Value) -> Option<Item> {
    match value {
        Value::Object(obj) => Some(Item::Table(json_object_to_table(obj))),
        other => json_value_to_toml(other, "").map(Item::Value),
    }
}

/// JSON object → TOML table; nested objects such as `env` become `[a.b.env]` subtables
fn json_object_to_table(obj: &Map<String, Value>) -> Table {
    let mut t = Table::new();
    for (k, v) in obj {
        match v {
            Value::Object(inner) => {
                t.insert(k, Item::Table(json_object_to_table(inner)));
            }
            other => {
                if let Some(value) = json_value_to_toml(other, k) {
                    t.insert(k, Item::Value(value));
                }
            }
        }
    }
    t
}

/// Generic JSON → TOML value conversion; `None` for values TOML cannot hold
fn json_value_to_toml(value: &Value, field_name: &str) -> Option<toml_edit::Value> {
    match value {
        Value::String(s) => Some(s.as_str().into()),
        Value::Bool(b) => Some((*b).into()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.into())
            } else if n.is_f64() {
                n.as_f64().map(Into::into)
            } else {
                log::warn!("Skipping field '{field_name}': number {n} does not fit a TOML integer");
                None
            }
        }
        Value::Array(items) => {
            let mut arr = Array::default();
            for item in items {
                arr.push(json_value_to_toml(item, field_name)?);
            }
            Some(toml_edit::Value::Array(arr))
        }
        Value::Object(obj) => {
            let mut inline = InlineTable::new();
            for (k, v) in obj {
                if let Some(tv) = json_value_to_toml(v, k) {
                    inline.insert(k, tv);
                }
            }
            Some(toml_edit::Value::InlineTable(inline))
        }
        Value::Null => {
            log::debug!("Skipping field '{field_name}': TOML has no null");
            None
        }
    }
}

/// TOML → JSON; datetimes become strings
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => json!(s),
        toml::Value::Integer(i) => json!(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => json!(b),
        toml::Value::Datetime(dt) => json!(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(tbl) => Value::Object(
            tbl.iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Copy of `value` with everything TOML cannot represent removed.
///
/// Object members that are null or out of range are dropped; an array holding
/// such an element is dropped as a whole. Returns `None` when nothing is left
/// of `value` itself.
pub fn toml_compatible(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Number(n) if !(n.is_i64() || n.is_f64()) => None,
        Value::Array(items) => items
            .iter()
            .map(toml_compatible)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Value::Object(obj) => Some(Value::Object(
            obj.iter()
                .filter_map(|(k, v)| toml_compatible(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}
