//! Storage-safe normalization of arbitrary JSON trees.
//!
//! The client app's schema never accepts `null` and expects every scalar as a
//! string. [`normalize`] is total: it always returns a value, and the result
//! never contains `Value::Null`.

use crate::COLLECTION_KEYS;
use log::warn;
use serde_json::{Map, Value};

/// Subtrees nested deeper than this are replaced by the path fallback.
pub const MAX_DEPTH: usize = 64;

/// Normalize `value` for storage. `path` names where the value lives in the
/// document (`"leaguesStandings"`, `"lastGame[0].events"`, ...) and picks the
/// fallback for a top-level `null`.
pub fn normalize(value: &Value, path: &str) -> Value {
    normalize_at(value, path, 0)
}

/// `[]` for paths ending in a collection name, `{}` otherwise.
pub fn empty_for_path(path: &str) -> Value {
    if COLLECTION_KEYS.iter().any(|key| path.ends_with(key)) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn normalize_at(value: &Value, path: &str, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        warn!("normalize: nesting deeper than {MAX_DEPTH} at {path}, substituting empty value");
        return empty_for_path(path);
    }

    match value {
        Value::Null => empty_for_path(path),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(s.trim().to_owned()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter().filter(|item| !item.is_null()) {
                let child = format!("{path}[{}]", out.len());
                out.push(normalize_at(item, &child, depth + 1));
            }
            Value::Array(out)
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                let key = key.trim();
                if key.is_empty() || item.is_null() {
                    continue;
                }
                let child = format!("{path}.{key}");
                out.insert(key.to_owned(), normalize_at(item, &child, depth + 1));
            }
            Value::Object(out)
        }
    }
}
