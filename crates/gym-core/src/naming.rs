//! # Field-Name Mapping
//!
//! Entities use camelCase names in memory; relational storage uses
//! snake_case columns. The translation is an explicit table generated once
//! per entity shape from [`Entity::FIELDS`], not a string transform applied
//! to every key. Keys that are not declared fields (map keys inside
//! `exerciseSelections`, nested log objects, unknown columns) pass through
//! untouched.
//!
//! ```text
//!   in memory                   storage
//!   ─────────────────────       ─────────────────────
//!   exerciseTypeId       ◄────► exercise_type_id
//!   targetRepsInReserve  ◄────► target_reps_in_reserve
//!   createdAt            ◄────► created_at
//! ```

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::entity::{CollectionKind, Entity};

/// Memoized tables, one per collection kind.
static FIELD_MAPS: Lazy<Mutex<HashMap<CollectionKind, Arc<FieldMap>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Converts a camelCase identifier to snake_case.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Bidirectional in-memory ↔ storage field-name table for one entity shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    to_storage: HashMap<String, String>,
    to_memory: HashMap<String, String>,
}

impl FieldMap {
    /// Builds a table from a list of in-memory field names.
    pub fn from_fields(fields: &[&str]) -> Self {
        let mut to_storage = HashMap::with_capacity(fields.len());
        let mut to_memory = HashMap::with_capacity(fields.len());
        for field in fields {
            let column = camel_to_snake(field);
            to_memory.insert(column.clone(), (*field).to_string());
            to_storage.insert((*field).to_string(), column);
        }
        FieldMap {
            to_storage,
            to_memory,
        }
    }

    /// Returns the shared table for `T`, building it on first use.
    pub fn for_entity<T: Entity>() -> Arc<FieldMap> {
        let mut maps = FIELD_MAPS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        maps.entry(T::KIND)
            .or_insert_with(|| Arc::new(FieldMap::from_fields(T::FIELDS)))
            .clone()
    }

    /// Storage column for an in-memory field name.
    pub fn to_storage<'a>(&'a self, field: &'a str) -> &'a str {
        self.to_storage.get(field).map(String::as_str).unwrap_or(field)
    }

    /// In-memory field name for a storage column.
    pub fn to_memory<'a>(&'a self, column: &'a str) -> &'a str {
        self.to_memory.get(column).map(String::as_str).unwrap_or(column)
    }

    /// Renames the top-level keys of an in-memory object to storage columns.
    pub fn encode_row(&self, row: Value) -> Value {
        rename_keys(row, &self.to_storage)
    }

    /// Renames the top-level keys of a storage row to in-memory names.
    pub fn decode_row(&self, row: Value) -> Value {
        rename_keys(row, &self.to_memory)
    }
}

fn rename_keys(row: Value, table: &HashMap<String, String>) -> Value {
    match row {
        Value::Object(map) => {
            let renamed: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| match table.get(&key) {
                    Some(target) => (target.clone(), value),
                    None => (key, value),
                })
                .collect();
            Value::Object(renamed)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Exercise, WorkoutSession};
    use serde_json::json;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("id"), "id");
        assert_eq!(camel_to_snake("exerciseTypeId"), "exercise_type_id");
        assert_eq!(camel_to_snake("targetRepsInReserve"), "target_reps_in_reserve");
    }

    #[test]
    fn test_table_is_memoized() {
        let first = FieldMap::for_entity::<Exercise>();
        let second = FieldMap::for_entity::<Exercise>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.to_storage("machineBrand"), "machine_brand");
        assert_eq!(first.to_memory("machine_brand"), "machineBrand");
    }

    #[test]
    fn test_only_declared_fields_are_translated() {
        let map = FieldMap::for_entity::<WorkoutSession>();
        let row = json!({
            "routineId": "r-1",
            "exerciseSelections": {"slotOne": "ex-1"},
            "exerciseLogs": [{"exerciseId": "ex-1"}],
            "user_id": "u-1"
        });
        let encoded = map.encode_row(row.clone());
        assert_eq!(
            encoded,
            json!({
                "routine_id": "r-1",
                "exercise_selections": {"slotOne": "ex-1"},
                "exercise_logs": [{"exerciseId": "ex-1"}],
                "user_id": "u-1"
            })
        );
        assert_eq!(map.decode_row(encoded), row);
    }

    #[test]
    fn test_non_objects_pass_through() {
        let map = FieldMap::from_fields(&["id"]);
        assert_eq!(map.encode_row(json!([1, 2])), json!([1, 2]));
    }
}
