//! Helpers for schema-light snapshot records.
//!
//! Upstream collections are plain JSON arrays of objects whose shape is not
//! guaranteed, so every field is read through one of these coercing accessors
//! instead of a fixed struct.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Read a field as a trimmed, non-empty string. Numbers and booleans are
/// rendered with their JSON spelling.
pub fn str_field(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a field as a volume number. Accepts JSON integers, integral floats
/// and numeric strings (optionally prefixed with `Vol-`).
pub fn u32_field(record: &Record, key: &str) -> Option<u32> {
    value_as_u32(record.get(key)?)
}

pub fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed.strip_prefix("Vol-").unwrap_or(trimmed);
            trimmed.parse::<u32>().ok()
        }
        _ => None,
    }
}

/// Parse a publication date. Empty input is `None`; both plain dates and
/// ISO datetimes are accepted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    // `2022-11-03T00:00:00Z`-style values with trailing zone designators
    trimmed
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

/// Strip the first matching prefix.
pub fn strip_any_prefix(value: &str, prefixes: &[&str]) -> String {
    for prefix in prefixes {
        if let Some(rest) = value.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    value.to_string()
}

/// Split a comma-separated free-text author list.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
