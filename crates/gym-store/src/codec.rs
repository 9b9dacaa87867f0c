//! # Collection Codec
//!
//! Converts a collection to the text stored under its key and back.
//!
//! ## Decode Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored text                                                            │
//! │     │  serde_json::from_str                                             │
//! │     ▼                                                                   │
//! │  Value::Array  (a legacy `{id: item}` object is flattened to its values)│
//! │     │                                                                   │
//! │     ├── normalize_dates: "2024-03-01T10:00:00" → "...T10:00:00.000Z"    │
//! │     │   (recursive, every nested object and array)                      │
//! │     │                                                                   │
//! │     ├── backfill: missing createdAt/updatedAt ← load time               │
//! │     ▼                                                                   │
//! │  Vec<T>  via serde                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Encoding is plain serde: `DateTime<Utc>` fields already serialize as
//! RFC 3339 text.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

use gym_core::equality::parse_instant;
use gym_core::Entity;

use crate::error::{StoreError, StoreResult};

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Serializes a collection to a JSON array.
pub fn encode_collection<T: Entity>(key: &str, items: &[T]) -> StoreResult<String> {
    serde_json::to_string(items).map_err(|e| StoreError::corrupt(key, e))
}

/// Parses the text stored under `key` into a collection.
///
/// `now` is used for entities that predate timestamp fields.
pub fn decode_collection<T: Entity>(
    key: &str,
    text: &str,
    now: DateTime<Utc>,
) -> StoreResult<Vec<T>> {
    let value: Value = serde_json::from_str(text).map_err(|e| StoreError::corrupt(key, e))?;

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(map) => map.into_iter().map(|(_, row)| row).collect(),
        Value::Null => Vec::new(),
        _ => return Err(StoreError::corrupt(key, "expected a JSON array")),
    };

    rows.into_iter()
        .map(|mut row| {
            normalize_dates(&mut row);
            if let Value::Object(map) = &mut row {
                backfill_timestamps(map, now);
            }
            serde_json::from_value(row).map_err(|e| StoreError::corrupt(key, e))
        })
        .collect()
}

/// Rewrites date-time strings without an offset as UTC RFC 3339, recursively.
pub fn normalize_dates(value: &mut Value) {
    match value {
        Value::String(text) => {
            if DateTime::parse_from_rfc3339(text).is_ok() {
                return;
            }
            if let Some(millis) = parse_instant(text) {
                if let Some(instant) = Utc.timestamp_millis_opt(millis).single() {
                    *text = instant.to_rfc3339_opts(SecondsFormat::Millis, true);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_dates),
        Value::Object(map) => map.values_mut().for_each(normalize_dates),
        _ => {}
    }
}

/// Fills in missing or null `createdAt`/`updatedAt`.
///
/// `updatedAt` falls back to `createdAt` when only the latter is present.
fn backfill_timestamps(map: &mut Map<String, Value>, now: DateTime<Utc>) {
    let now = Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let created = match map.get(CREATED_AT) {
        Some(v) if !v.is_null() => v.clone(),
        _ => {
            map.insert(CREATED_AT.to_string(), now.clone());
            now
        }
    };

    if map.get(UPDATED_AT).map_or(true, Value::is_null) {
        map.insert(UPDATED_AT.to_string(), created);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gym_core::{ExerciseType, WorkoutSession};
    use serde_json::json;

    fn load_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_backfills_missing_timestamps() {
        let text = r#"[{"id":"1","name":"Bench"},
                       {"id":"2","name":"Row","createdAt":"2024-01-01T00:00:00.000Z"}]"#;
        let items: Vec<ExerciseType> = decode_collection("k", text, load_time()).unwrap();

        assert_eq!(items[0].created_at, load_time());
        assert_eq!(items[0].updated_at, load_time());
        let jan = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(items[1].created_at, jan);
        assert_eq!(items[1].updated_at, jan);
    }

    #[test]
    fn test_naive_nested_dates_are_read_as_utc() {
        let text = json!([{
            "id": "s-1",
            "routineId": "r-1",
            "startTime": "2024-03-01T10:00:00",
            "exerciseLogs": [{
                "id": "l-1",
                "exerciseId": "e-1",
                "exerciseTypeId": "t-1",
                "createdAt": "2024-03-01T10:05:00.250",
                "sets": [{"id": "x", "weight": 50, "reps": 10, "createdAt": "2024-03-01T10:06:00"}]
            }],
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        }])
        .to_string();

        let sessions: Vec<WorkoutSession> = decode_collection("k", &text, load_time()).unwrap();
        let log = &sessions[0].exercise_logs[0];
        assert_eq!(
            sessions[0].start_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(log.created_at.timestamp_subsec_millis(), 250);
        assert_eq!(log.sets[0].weight, 50.0);
    }

    #[test]
    fn test_legacy_object_layout_is_flattened() {
        let text = r#"{"1":{"id":"1","name":"Bench",
            "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}}"#;
        let items: Vec<ExerciseType> = decode_collection("k", text, load_time()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bench");
    }

    #[test]
    fn test_rejects_non_collection_values() {
        let err = decode_collection::<ExerciseType>("ns:exercise-types", "42", load_time())
            .unwrap_err();
        assert!(err.to_string().contains("ns:exercise-types"));
        assert!(decode_collection::<ExerciseType>("k", "not json", load_time()).is_err());
    }

    #[test]
    fn test_non_date_strings_untouched() {
        let mut value = json!({"name": "2024 Plan", "range": "8-12"});
        let before = value.clone();
        normalize_dates(&mut value);
        assert_eq!(value, before);
    }
}
