//! # Domain Types
//!
//! The records a user creates while tracking workouts.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ExerciseType   │◄──│    Exercise     │   │    Program      │       │
//! │  │  "Chest Press"  │   │  machine, reps  │   │  routine_ids ───┼──┐    │
//! │  └────────▲────────┘   └─────────────────┘   └─────────────────┘  │    │
//! │           │                                                        │    │
//! │  ┌────────┴────────┐   ┌───────────────────────────────────────┐  │    │
//! │  │    Routine      │◄──│           WorkoutSession              │◄─┘    │
//! │  │ exercise_type_ids│  │  exercise_logs[] ─► sets[] (SetLog)   │       │
//! │  └─────────────────┘   └───────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All types serialize with camelCase field names; that is the in-memory
//! naming convention shared by the local store and the remote mapping table.
//! Optional fields serialize as `null` rather than being skipped, so every
//! value of a type has the same key set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::{CollectionKind, Entity};

/// Implements [`Entity`] for a struct with `id`, `created_at`, `updated_at`.
macro_rules! impl_entity {
    ($ty:ty, $kind:expr, [$($field:literal),+ $(,)?]) => {
        impl Entity for $ty {
            const KIND: CollectionKind = $kind;
            const FIELDS: &'static [&'static str] = &[$($field),+];

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn set_updated_at(&mut self, at: DateTime<Utc>) {
                self.updated_at = at;
            }
        }
    };
}

// =============================================================================
// Exercise Type
// =============================================================================

/// A movement category such as "Chest Press" or "Squat".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseType {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(
    ExerciseType,
    CollectionKind::ExerciseTypes,
    ["id", "name", "createdAt", "updatedAt"]
);

// =============================================================================
// Exercise
// =============================================================================

/// A concrete exercise (often a specific machine) belonging to a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,

    /// Manufacturer of the machine, if any.
    #[serde(default)]
    pub machine_brand: Option<String>,

    /// Free-form target such as `"8-12"`.
    pub target_rep_range: String,

    #[serde(default)]
    pub target_reps_in_reserve: Option<u32>,

    /// Owning [`ExerciseType`].
    pub exercise_type_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(
    Exercise,
    CollectionKind::Exercises,
    [
        "id",
        "name",
        "machineBrand",
        "targetRepRange",
        "targetRepsInReserve",
        "exerciseTypeId",
        "createdAt",
        "updatedAt",
    ]
);

// =============================================================================
// Routine
// =============================================================================

/// An ordered list of exercise types performed in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercise_type_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(
    Routine,
    CollectionKind::Routines,
    ["id", "name", "exerciseTypeIds", "createdAt", "updatedAt"]
);

// =============================================================================
// Program
// =============================================================================

/// A rotation of routines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub routine_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(
    Program,
    CollectionKind::Programs,
    ["id", "name", "routineIds", "createdAt", "updatedAt"]
);

// =============================================================================
// Workout Session
// =============================================================================

/// One performed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLog {
    pub id: String,
    /// Load in kilograms.
    pub weight: f64,
    pub reps: u32,
    /// Reps in reserve.
    #[serde(default)]
    pub rir: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Sets performed for one exercise during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub id: String,
    pub exercise_id: String,
    pub exercise_type_id: String,
    #[serde(default)]
    pub sets: Vec<SetLog>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recorded (or in-progress) workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,

    #[serde(default)]
    pub program_id: Option<String>,

    pub routine_id: String,

    #[serde(default)]
    pub exercise_logs: Vec<ExerciseLog>,

    /// Routine slot index → chosen exercise id. Keys are data, not field
    /// names, and are never case-translated.
    #[serde(default)]
    pub exercise_selections: Option<BTreeMap<String, String>>,

    pub start_time: DateTime<Utc>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Whole minutes between start and end.
    #[serde(default)]
    pub duration: Option<i64>,

    /// Σ weight × reps in kilograms.
    #[serde(default)]
    pub total_volume: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutSession {
    /// Returns true while the session has not been finished.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

impl_entity!(
    WorkoutSession,
    CollectionKind::WorkoutSessions,
    [
        "id",
        "programId",
        "routineId",
        "exerciseLogs",
        "exerciseSelections",
        "startTime",
        "endTime",
        "duration",
        "totalVolume",
        "createdAt",
        "updatedAt",
    ]
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_exercise() -> Exercise {
        let now = Utc::now();
        Exercise {
            id: "ex-1".into(),
            name: "Chest Press".into(),
            machine_brand: None,
            target_rep_range: "8-12".into(),
            target_reps_in_reserve: Some(2),
            exercise_type_id: "type-1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fields_match_serialized_keys() {
        let value = serde_json::to_value(sample_exercise()).unwrap();
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        let mut fields = Exercise::FIELDS.to_vec();
        keys.sort_unstable();
        fields.sort_unstable();
        assert_eq!(keys, fields);
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{
            "id": "r-1",
            "name": "Push",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let routine: Routine = serde_json::from_str(json).unwrap();
        assert!(routine.exercise_type_ids.is_empty());
    }

    #[test]
    fn test_session_is_active_until_ended() {
        let now = Utc::now();
        let mut session = WorkoutSession {
            id: "s-1".into(),
            program_id: None,
            routine_id: "r-1".into(),
            exercise_logs: Vec::new(),
            exercise_selections: None,
            start_time: now,
            end_time: None,
            duration: None,
            total_volume: None,
            created_at: now,
            updated_at: now,
        };
        assert!(session.is_active());
        session.end_time = Some(now);
        assert!(!session.is_active());
    }
}
