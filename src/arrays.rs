//! Helpers for untyped JSON trees.

use serde_json::Value;

/// Trim leading and trailing whitespace from every string in the tree,
/// recursing through objects and arrays.
pub fn trim_strings(value: &mut Value) {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_owned();
            }
        }
        Value::Array(items) => {
            for item in items {
                trim_strings(item);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                trim_strings(item);
            }
        }
        _ => {}
    }
}
