//! Rendering msgpack values returned by Neovim.
//!
//! Neovim answers with dynamically typed msgpack. Tools either want the
//! value as JSON (structured replies) or as plain text (script output).

use rmpv::Value;
use serde_json::{Map, Number};

/// Convert a msgpack value into JSON.
///
/// Map keys that are not strings are rendered with [`to_text`]. Ext values
/// (Neovim's buffer, window and tabpage handles) become their integer handle
/// when the payload decodes to one.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => i
            .as_i64()
            .map(Number::from)
            .or_else(|| i.as_u64().map(Number::from))
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::F32(f) => float_to_json(f64::from(*f)),
        Value::F64(f) => float_to_json(*f),
        Value::String(s) => {
            serde_json::Value::String(String::from_utf8_lossy(s.as_bytes()).into_owned())
        }
        Value::Binary(bytes) => bytes_to_json(bytes),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                map.insert(to_text(k), to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::Ext(_, data) => match ext_handle(data) {
            Some(handle) => serde_json::Value::from(handle),
            None => bytes_to_json(data),
        },
    }
}

/// Render a msgpack value as human-readable text.
///
/// Strings are returned verbatim, nil becomes `nil` and compound values are
/// rendered as compact JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_owned(),
        Value::String(s) => String::from_utf8_lossy(s.as_bytes()).into_owned(),
        _ => to_json(value).to_string(),
    }
}

/// Describe the msgpack type of a value, for shape errors.
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::F32(_) | Value::F64(_) => "float",
        Value::String(_) => "string",
        Value::Binary(_) => "binary",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        Value::Ext(..) => "ext",
    }
}

/// Look up a string key in a msgpack map.
pub fn map_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_map()?
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

fn bytes_to_json(bytes: &[u8]) -> serde_json::Value {
    serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
}

fn float_to_json(f: f64) -> serde_json::Value {
    Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn ext_handle(data: &[u8]) -> Option<i64> {
    let mut rd = data;
    rmpv::decode::read_value(&mut rd).ok()?.as_i64()
}
