//! # Entity Factory
//!
//! Constructors that stamp a fresh UUID and a shared creation instant on new
//! records, plus small helpers for producing the next state of a collection.
//!
//! Collections are treated as values: every helper returns a new `Vec` that
//! callers hand to `EntityStore::set`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{now_millis, Entity};
use crate::types::{Exercise, ExerciseLog, ExerciseType, Program, Routine, SetLog, WorkoutSession};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Inputs
// =============================================================================

/// Fields a caller supplies when creating an [`Exercise`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseInput {
    pub name: String,
    #[serde(default)]
    pub machine_brand: Option<String>,
    pub target_rep_range: String,
    #[serde(default)]
    pub target_reps_in_reserve: Option<u32>,
    pub exercise_type_id: String,
}

/// Fields a caller supplies when creating a [`Routine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoutineInput {
    pub name: String,
    #[serde(default)]
    pub exercise_type_ids: Vec<String>,
}

/// Fields a caller supplies when creating a [`Program`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgramInput {
    pub name: String,
    #[serde(default)]
    pub routine_ids: Vec<String>,
}

// =============================================================================
// Constructors
// =============================================================================

pub fn new_exercise_type(name: impl Into<String>) -> ExerciseType {
    let now = now_millis();
    ExerciseType {
        id: new_id(),
        name: name.into(),
        created_at: now,
        updated_at: now,
    }
}

pub fn new_exercise(input: CreateExerciseInput) -> Exercise {
    let now = now_millis();
    Exercise {
        id: new_id(),
        name: input.name,
        machine_brand: input.machine_brand,
        target_rep_range: input.target_rep_range,
        target_reps_in_reserve: input.target_reps_in_reserve,
        exercise_type_id: input.exercise_type_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_routine(input: CreateRoutineInput) -> Routine {
    let now = now_millis();
    Routine {
        id: new_id(),
        name: input.name,
        exercise_type_ids: input.exercise_type_ids,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_program(input: CreateProgramInput) -> Program {
    let now = now_millis();
    Program {
        id: new_id(),
        name: input.name,
        routine_ids: input.routine_ids,
        created_at: now,
        updated_at: now,
    }
}

/// Starts a session for `routine_id`, optionally as part of a program.
pub fn new_workout_session(routine_id: impl Into<String>, program_id: Option<String>) -> WorkoutSession {
    let now = now_millis();
    WorkoutSession {
        id: new_id(),
        program_id,
        routine_id: routine_id.into(),
        exercise_logs: Vec::new(),
        exercise_selections: None,
        start_time: now,
        end_time: None,
        duration: None,
        total_volume: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_exercise_log(exercise_id: impl Into<String>, exercise_type_id: impl Into<String>) -> ExerciseLog {
    ExerciseLog {
        id: new_id(),
        exercise_id: exercise_id.into(),
        exercise_type_id: exercise_type_id.into(),
        sets: Vec::new(),
        notes: None,
        created_at: now_millis(),
    }
}

pub fn new_set_log(weight: f64, reps: u32, rir: Option<u32>) -> SetLog {
    SetLog {
        id: new_id(),
        weight,
        reps,
        rir,
        created_at: now_millis(),
    }
}

/// Bumps `updated_at` to now.
pub fn touch<T: Entity>(mut entity: T) -> T {
    entity.set_updated_at(now_millis());
    entity
}

/// Bumps `updated_at` to a given instant.
pub fn touch_at<T: Entity>(mut entity: T, at: DateTime<Utc>) -> T {
    entity.set_updated_at(at);
    entity
}

// =============================================================================
// Collection Helpers
// =============================================================================

/// Returns `items` with `item` appended.
pub fn add_to<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// Returns `items` with the entity `id` replaced by `update(entity)`.
///
/// Other entities are cloned unchanged; a missing id yields an unchanged copy.
pub fn update_in<T: Entity>(items: &[T], id: &str, update: impl FnOnce(T) -> T) -> Vec<T> {
    let mut next = items.to_vec();
    if let Some(slot) = next.iter_mut().find(|item| item.id() == id) {
        *slot = update(slot.clone());
    }
    next
}

/// Returns `items` without the entity `id`.
pub fn remove_from<T: Entity>(items: &[T], id: &str) -> Vec<T> {
    items.iter().filter(|item| item.id() != id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entities_share_creation_instant() {
        let t = new_exercise_type("Chest Press");
        assert_eq!(t.created_at, t.updated_at);
        assert!(Uuid::parse_str(&t.id).is_ok());

        let session = new_workout_session("routine-1", None);
        assert_eq!(session.start_time, session.created_at);
        assert!(session.is_active());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_exercise_type("A");
        let b = new_exercise_type("A");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_exercise_copies_input() {
        let ex = new_exercise(CreateExerciseInput {
            name: "Pec Deck".into(),
            machine_brand: Some("Hammer Strength".into()),
            target_rep_range: "10-15".into(),
            target_reps_in_reserve: Some(1),
            exercise_type_id: "type-1".into(),
        });
        assert_eq!(ex.name, "Pec Deck");
        assert_eq!(ex.machine_brand.as_deref(), Some("Hammer Strength"));
        assert_eq!(ex.exercise_type_id, "type-1");
    }

    #[test]
    fn test_touch_moves_updated_at_only() {
        let t = new_exercise_type("Row");
        let later = t.created_at + chrono::TimeDelta::seconds(5);
        let touched = touch_at(t.clone(), later);
        assert_eq!(touched.created_at, t.created_at);
        assert_eq!(touched.updated_at, later);
    }

    #[test]
    fn test_collection_helpers() {
        let a = new_exercise_type("A");
        let b = new_exercise_type("B");

        let items = add_to(&[a.clone()], b.clone());
        assert_eq!(items.len(), 2);

        let renamed = update_in(&items, &b.id, |mut t| {
            t.name = "B2".into();
            t
        });
        assert_eq!(renamed[0], a);
        assert_eq!(renamed[1].name, "B2");

        let unchanged = update_in(&items, "missing", |mut t| {
            t.name = "never".into();
            t
        });
        assert_eq!(unchanged, items);

        let removed = remove_from(&renamed, &a.id);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, b.id);
    }
}
