//! # Entity Contract
//!
//! Every persisted record implements [`Entity`]: an opaque string id plus
//! `createdAt`/`updatedAt` instants. Identity is by id only; two values with
//! the same id are "the same entity" even when their content differs.
//!
//! ## Collection Kinds
//! ```text
//! ┌──────────────────┬─────────────────────┬──────────────────────┐
//! │ CollectionKind   │ local key suffix    │ remote table         │
//! ├──────────────────┼─────────────────────┼──────────────────────┤
//! │ ExerciseTypes    │ exercise-types      │ exercise_types       │
//! │ Exercises        │ exercises           │ exercises            │
//! │ Routines         │ routines            │ routines             │
//! │ Programs         │ programs            │ programs             │
//! │ WorkoutSessions  │ workout-sessions    │ workout_sessions     │
//! └──────────────────┴─────────────────────┴──────────────────────┘
//! ```

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Collection Kind
// =============================================================================

/// The five collections the tracker persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    ExerciseTypes,
    Exercises,
    Routines,
    Programs,
    WorkoutSessions,
}

impl CollectionKind {
    /// All collection kinds, in dependency order (parents first).
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::ExerciseTypes,
        CollectionKind::Exercises,
        CollectionKind::Routines,
        CollectionKind::Programs,
        CollectionKind::WorkoutSessions,
    ];

    /// Name used in local storage keys.
    pub const fn collection_name(&self) -> &'static str {
        match self {
            CollectionKind::ExerciseTypes => "exercise-types",
            CollectionKind::Exercises => "exercises",
            CollectionKind::Routines => "routines",
            CollectionKind::Programs => "programs",
            CollectionKind::WorkoutSessions => "workout-sessions",
        }
    }

    /// Name of the remote table.
    pub const fn table_name(&self) -> &'static str {
        match self {
            CollectionKind::ExerciseTypes => "exercise_types",
            CollectionKind::Exercises => "exercises",
            CollectionKind::Routines => "routines",
            CollectionKind::Programs => "programs",
            CollectionKind::WorkoutSessions => "workout_sessions",
        }
    }

    /// Builds the local storage key `<namespace>:<collection-name>`.
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{}:{}", namespace, self.collection_name())
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

// =============================================================================
// Entity Trait
// =============================================================================

/// A uniquely identified, timestamped record.
///
/// `FIELDS` lists the in-memory (camelCase) names of every top-level field.
/// It is the single source for the storage column mapping, so keep it in sync
/// with the struct's serde representation.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection this entity belongs to.
    const KIND: CollectionKind;

    /// Top-level field names in their in-memory form.
    const FIELDS: &'static [&'static str];

    /// Opaque unique identifier.
    fn id(&self) -> &str;

    /// When the entity was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// When the entity was last modified.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Overwrites the modification instant.
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Current instant truncated to millisecond precision.
///
/// Stored instants are ISO-8601 with millisecond precision, so truncating at
/// creation keeps a value identical across a save/load cycle.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_convention() {
        assert_eq!(
            CollectionKind::ExerciseTypes.storage_key("gym-tracker"),
            "gym-tracker:exercise-types"
        );
        assert_eq!(
            CollectionKind::WorkoutSessions.storage_key("test"),
            "test:workout-sessions"
        );
    }

    #[test]
    fn test_table_names_are_snake_case() {
        for kind in CollectionKind::ALL {
            assert!(!kind.table_name().contains('-'), "{kind}");
        }
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
