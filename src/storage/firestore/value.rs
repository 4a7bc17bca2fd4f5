//! Firestore value mapping
//!
//! The REST API wraps every field in a typed value object
//! (`{"stringValue": ...}`). These helpers convert between those wrappers
//! and the domain types.

use crate::utils::error::{Result, RunnerError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// Wrap a string
pub fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

/// Wrap an integer. Firestore carries integers as decimal strings.
pub fn integer_value(i: i64) -> Value {
    json!({ "integerValue": i.to_string() })
}

/// Wrap a timestamp as RFC 3339 with microsecond precision
pub fn timestamp_value(t: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

/// Read a string field
pub fn get_string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields
        .get(name)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

/// Read an integer field
pub fn get_integer(fields: &Map<String, Value>, name: &str) -> Option<i64> {
    let value = fields.get(name)?.get("integerValue")?;
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Read a timestamp field
pub fn get_timestamp(fields: &Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(name)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Serialize a unit enum to its wire string (serde rename attributes are the
/// single source of truth for wire names)
pub fn to_wire_str<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        Value::String(s) => Ok(s),
        other => Err(RunnerError::Store(format!(
            "expected string-valued enum, got {}",
            other
        ))),
    }
}

/// Deserialize a unit enum from its wire string
pub fn from_wire_str<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|e| RunnerError::Store(format!("unknown wire value {}: {}", raw, e)))
}
