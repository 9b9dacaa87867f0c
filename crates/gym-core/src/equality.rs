//! # Structural Equality
//!
//! Deep comparison of JSON-shaped values used by the delta computation to
//! decide whether an entity changed.
//!
//! ## Rules
//! ```text
//! ┌──────────────────────┬───────────────────────────────────────────────┐
//! │ left / right         │ equal when                                    │
//! ├──────────────────────┼───────────────────────────────────────────────┤
//! │ null / null          │ always                                        │
//! │ null / anything else │ never                                         │
//! │ instant / instant    │ same epoch millisecond (format ignored)       │
//! │ number / number      │ same numeric value (1 == 1.0)                 │
//! │ array / array        │ same length, element-wise equal               │
//! │ object / object      │ same key set, value-wise equal                │
//! │ other                │ identical scalar                              │
//! └──────────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! Timestamps travel as ISO-8601 strings once an entity has been serialized,
//! and different producers format the same instant differently
//! (`...00Z`, `...00.000Z`, `...00+00:00`). Comparing them as text would report
//! a change on every reload.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

/// Returns true if two JSON values are structurally equal.
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            if a.is_f64() || b.is_f64() {
                a.as_f64() == b.as_f64()
            } else {
                a == b
            }
        }
        (Value::String(a), Value::String(b)) => {
            if a == b {
                return true;
            }
            match (parse_instant(a), parse_instant(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => false,
    }
}

/// Compares two serializable values with [`deep_equal`].
///
/// A value that fails to serialize is never equal to anything.
pub fn entities_equal<T: Serialize>(left: &T, right: &T) -> bool {
    match (serde_json::to_value(left), serde_json::to_value(right)) {
        (Ok(a), Ok(b)) => deep_equal(&a, &b),
        _ => false,
    }
}

/// Parses an ISO-8601 date-time string into epoch milliseconds.
///
/// Strings without an offset are read as UTC. Returns `None` for anything
/// that is not shaped like `YYYY-MM-DDTHH:MM...`.
pub fn parse_instant(text: &str) -> Option<i64> {
    if !looks_like_instant(text) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Cheap shape check so ordinary strings never reach the parser.
fn looks_like_instant(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 16 {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    digits(0..4)
        && bytes[4] == b'-'
        && digits(5..7)
        && bytes[7] == b'-'
        && digits(8..10)
        && bytes[10] == b'T'
        && digits(11..13)
        && bytes[13] == b':'
}
