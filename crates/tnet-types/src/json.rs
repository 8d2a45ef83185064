//! JSON view of decoded values.
//!
//! The echo server replies with the JSON rendering of each value it
//! decodes, and the client compares that reply against the rendering of
//! the value it sent. Both sides go through [`render`], so the comparison
//! is purely semantic.
//!
//! ```text
//! ┌───────────┬──────────────────────────────────────────┐
//! │ TnetValue │ JSON                                     │
//! ├───────────┼──────────────────────────────────────────┤
//! │ Null      │ null                                     │
//! │ Boolean   │ true / false                             │
//! │ Integer   │ number                                   │
//! │ Float     │ number (non-finite → null)               │
//! │ String    │ string (bytes must be UTF-8)             │
//! │ List      │ array                                    │
//! │ Dict      │ object (keys must be UTF-8)              │
//! └───────────┴──────────────────────────────────────────┘
//! ```

use std::convert::Infallible;

use serde_json::{Map, Number, Value};

use crate::error::TypeError;
use crate::value::TnetValue;

/// Convert a decoded value to a `serde_json::Value`.
///
/// # Errors
///
/// [`TypeError::InvalidUtf8`] if any string or dict key is not UTF-8.
pub fn to_json(value: &TnetValue) -> Result<Value, TypeError> {
    convert(value, &|bytes: &[u8]| utf8(bytes).map(str::to_owned))
}

/// Like [`to_json`], but invalid UTF-8 in strings and keys becomes
/// U+FFFD instead of an error.
#[must_use]
pub fn to_json_lossy(value: &TnetValue) -> Value {
    let Ok(json) = convert::<Infallible>(value, &|bytes: &[u8]| Ok(String::from_utf8_lossy(bytes).into_owned()));
    json
}

fn convert<E>(value: &TnetValue, text: &impl Fn(&[u8]) -> Result<String, E>) -> Result<Value, E> {
    Ok(match value {
        TnetValue::Null => Value::Null,
        TnetValue::Boolean(b) => Value::Bool(*b),
        TnetValue::Integer(n) => Value::Number((*n).into()),
        TnetValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        TnetValue::String(bytes) => Value::String(text(bytes)?),
        TnetValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| convert(item, text))
                .collect::<Result<_, _>>()?,
        ),
        TnetValue::Dict(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, item) in map {
                object.insert(text(key)?, convert(item, text)?);
            }
            Value::Object(object)
        }
    })
}

/// Convert a JSON value into the value the encoder should send.
///
/// Integers that fit `i64` stay integers; every other number becomes a
/// float.
#[must_use]
pub fn from_json(value: &Value) -> TnetValue {
    match value {
        Value::Null => TnetValue::Null,
        Value::Bool(b) => TnetValue::Boolean(*b),
        Value::Number(n) => n
            .as_i64()
            .map(TnetValue::Integer)
            .or_else(|| n.as_f64().map(TnetValue::Float))
            .unwrap_or(TnetValue::Null),
        Value::String(s) => TnetValue::from(s.as_str()),
        Value::Array(items) => TnetValue::List(items.iter().map(from_json).collect()),
        Value::Object(object) => TnetValue::dict(object.iter().map(|(k, v)| (k.as_str(), from_json(v)))),
    }
}

/// Compact JSON text for `value`, as sent on the wire by the echo server.
///
/// # Errors
///
/// [`TypeError::InvalidUtf8`] if any string or dict key is not UTF-8.
pub fn render(value: &TnetValue) -> Result<String, TypeError> {
    Ok(to_json(value)?.to_string())
}

/// Compact JSON text for `value`, replacing invalid UTF-8 with U+FFFD.
#[must_use]
pub fn render_lossy(value: &TnetValue) -> String {
    to_json_lossy(value).to_string()
}

fn utf8(bytes: &[u8]) -> Result<&str, TypeError> {
    std::str::from_utf8(bytes).map_err(|e| TypeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}
