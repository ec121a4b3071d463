//! Safe nested lookups into loosely shaped JSON
//!
//! A path segment addresses an object key, or an array index when the node is
//! an array. Missing keys, null nodes and intermediate nodes of the wrong type
//! all collapse to `None`.

use serde_json::Value;

/// Follows `path` from `value`, returning the node if it exists and is not null
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |node, key| match node {
            Value::Object(map) => map.get(*key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|node| !node.is_null())
}

/// Follows `path` and renders a scalar node as text
pub fn lookup_text(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path).and_then(scalar_text)
}

/// Follows `path` and returns the array there, or an empty slice
pub fn lookup_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Strings, numbers and booleans as text; everything else is not a field value
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
