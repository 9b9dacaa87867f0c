//! # Delta Computation
//!
//! Compares the last confirmed state of a collection with the desired next
//! state and produces the smallest set of backend operations that turns one
//! into the other.
//!
//! ## Diff Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Snapshot (id → entity)            next: &[T]                          │
//! │          │                               │                              │
//! │          └──────────────┬────────────────┘                              │
//! │                         ▼                                               │
//! │   for item in next:                                                     │
//! │     id ∉ snapshot                    ──► to_create                      │
//! │     id ∈ snapshot && !deep_equal     ──► to_update                      │
//! │   for id in snapshot:                                                   │
//! │     id ∉ next                        ──► to_delete                      │
//! │                                                                         │
//! │   Apply order (backend policy): delete → update → create                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use crate::entity::Entity;
use crate::equality::entities_equal;

// =============================================================================
// Delta
// =============================================================================

/// The minimal change set between two states of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<T> {
    /// Items whose id is not in the snapshot.
    pub to_create: Vec<T>,
    /// Items present in both states whose content changed.
    pub to_update: Vec<T>,
    /// Ids present in the snapshot but absent from the next state.
    pub to_delete: Vec<String>,
}

impl<T> Delta<T> {
    /// A delta with no operations.
    pub fn empty() -> Self {
        Delta {
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    /// Returns true when applying the delta would not touch the backend.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

impl<T> Default for Delta<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Last backend-confirmed state of a collection.
///
/// Keeps the items in their original order alongside an id index so the
/// rollback path can restore exactly what was confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Entity> Snapshot<T> {
    /// An empty snapshot.
    pub fn new() -> Self {
        Snapshot {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a snapshot from a collection.
    ///
    /// Ids are expected to be unique; if one repeats, the last occurrence wins.
    pub fn from_items(items: Vec<T>) -> Self {
        let mut unique: Vec<T> = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for item in items {
            match index.get(item.id()) {
                Some(&pos) => unique[pos] = item,
                None => {
                    index.insert(item.id().to_string(), unique.len());
                    unique.push(item);
                }
            }
        }
        Snapshot {
            items: unique,
            index,
        }
    }

    /// Looks up an entity by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Confirmed items in their original order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Entity> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Diff
// =============================================================================

/// Computes the minimal delta from `previous` to `next`.
///
/// Entities are matched by id and compared with
/// [`deep_equal`](crate::equality::deep_equal), so re-serialized timestamps do
/// not count as changes. A duplicated id in `next` is considered once (first
/// occurrence).
pub fn diff<T: Entity>(previous: &Snapshot<T>, next: &[T]) -> Delta<T> {
    let mut delta = Delta::empty();
    let mut seen: HashSet<&str> = HashSet::with_capacity(next.len());

    for item in next {
        if !seen.insert(item.id()) {
            continue;
        }
        match previous.get(item.id()) {
            None => delta.to_create.push(item.clone()),
            Some(old) if !entities_equal(old, item) => delta.to_update.push(item.clone()),
            Some(_) => {}
        }
    }

    delta.to_delete = previous
        .items()
        .iter()
        .filter(|old| !seen.contains(old.id()))
        .map(|old| old.id().to_string())
        .collect();

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExerciseType;
    use chrono::{TimeZone, Utc};

    fn exercise_type(id: &str, name: &str) -> ExerciseType {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        ExerciseType {
            id: id.into(),
            name: name.into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_identical_state_yields_empty_delta() {
        let items = vec![exercise_type("1", "Bench"), exercise_type("2", "Squat")];
        let snapshot = Snapshot::from_items(items.clone());
        let delta = diff(&snapshot, &items);
        assert!(delta.is_empty());
        assert_eq!(delta.len(), 0);
    }

    #[test]
    fn test_create_into_empty_snapshot() {
        let a = exercise_type("a", "Bench");
        let delta = diff(&Snapshot::new(), &[a.clone()]);
        assert_eq!(delta.to_create, vec![a]);
        assert!(delta.to_update.is_empty());
        assert!(delta.to_delete.is_empty());
    }

    #[test]
    fn test_replace_is_create_plus_delete() {
        let a = exercise_type("a", "Bench");
        let b = exercise_type("b", "Squat");
        let snapshot = Snapshot::from_items(vec![a]);
        let delta = diff(&snapshot, &[b.clone()]);
        assert_eq!(delta.to_create, vec![b]);
        assert!(delta.to_update.is_empty());
        assert_eq!(delta.to_delete, vec!["a".to_string()]);
    }

    #[test]
    fn test_changed_content_is_update() {
        let snapshot = Snapshot::from_items(vec![exercise_type("1", "Bench")]);
        let heavier = exercise_type("1", "Bench Heavy");
        let delta = diff(&snapshot, &[heavier.clone()]);
        assert_eq!(delta.to_update, vec![heavier]);
        assert!(delta.to_create.is_empty());
        assert!(delta.to_delete.is_empty());
    }

    #[test]
    fn test_reparsed_timestamp_is_not_an_update() {
        let original = exercise_type("1", "Bench");
        let json = r#"{"id":"1","name":"Bench",
            "createdAt":"2024-03-01T10:00:00.000Z",
            "updatedAt":"2024-03-01T12:00:00+02:00"}"#;
        let reparsed: ExerciseType = serde_json::from_str(json).unwrap();
        let snapshot = Snapshot::from_items(vec![original]);
        assert!(diff(&snapshot, &[reparsed]).is_empty());
    }

    #[test]
    fn test_duplicate_ids_in_next_are_counted_once() {
        let a = exercise_type("a", "Bench");
        let delta = diff(&Snapshot::new(), &[a.clone(), a.clone()]);
        assert_eq!(delta.to_create.len(), 1);
    }

    #[test]
    fn test_snapshot_last_duplicate_wins() {
        let snapshot = Snapshot::from_items(vec![
            exercise_type("1", "Old"),
            exercise_type("1", "New"),
        ]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("1").unwrap().name, "New");
    }
}
