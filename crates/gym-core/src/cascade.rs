//! # Cascade Deletes
//!
//! Removing a parent record also removes or detaches the records that point
//! at it. The functions here compute the next state of every affected
//! collection; callers `set()` each result on its own store.
//!
//! ```text
//!   delete ExerciseType T
//!     exercise_types  ── remove T
//!     exercises       ── remove every exercise with exercise_type_id == T
//!     routines        ── strip T from exercise_type_ids (touched)
//!
//!   delete Routine R
//!     routines        ── remove R
//!     programs        ── strip R from routine_ids (touched)
//! ```
//!
//! Only records that actually referenced the deleted id are touched, so the
//! resulting deltas contain no spurious updates.

use crate::entity::now_millis;
use crate::factory::remove_from;
use crate::types::{Exercise, ExerciseType, Program, Routine};

/// Next state of the collections affected by deleting an exercise type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTypeRemoval {
    pub exercise_types: Vec<ExerciseType>,
    pub exercises: Vec<Exercise>,
    pub routines: Vec<Routine>,
}

/// Next state of the collections affected by deleting a routine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineRemoval {
    pub routines: Vec<Routine>,
    pub programs: Vec<Program>,
}

/// Removes exercise type `id` together with its exercises and routine slots.
pub fn remove_exercise_type(
    exercise_types: &[ExerciseType],
    exercises: &[Exercise],
    routines: &[Routine],
    id: &str,
) -> ExerciseTypeRemoval {
    let now = now_millis();
    ExerciseTypeRemoval {
        exercise_types: remove_from(exercise_types, id),
        exercises: exercises
            .iter()
            .filter(|ex| ex.exercise_type_id != id)
            .cloned()
            .collect(),
        routines: routines
            .iter()
            .map(|routine| {
                if !routine.exercise_type_ids.iter().any(|t| t == id) {
                    return routine.clone();
                }
                let mut next = routine.clone();
                next.exercise_type_ids.retain(|t| t != id);
                next.updated_at = now;
                next
            })
            .collect(),
    }
}

/// Removes routine `id` and detaches it from every program.
pub fn remove_routine(routines: &[Routine], programs: &[Program], id: &str) -> RoutineRemoval {
    let now = now_millis();
    RoutineRemoval {
        routines: remove_from(routines, id),
        programs: programs
            .iter()
            .map(|program| {
                if !program.routine_ids.iter().any(|r| r == id) {
                    return program.clone();
                }
                let mut next = program.clone();
                next.routine_ids.retain(|r| r != id);
                next.updated_at = now;
                next
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{
        new_exercise, new_exercise_type, new_program, new_routine, CreateExerciseInput,
        CreateProgramInput, CreateRoutineInput,
    };

    fn exercise_for(type_id: &str, name: &str) -> Exercise {
        new_exercise(CreateExerciseInput {
            name: name.into(),
            machine_brand: None,
            target_rep_range: "8-12".into(),
            target_reps_in_reserve: None,
            exercise_type_id: type_id.into(),
        })
    }

    #[test]
    fn test_remove_exercise_type_cascades() {
        let chest = new_exercise_type("Chest");
        let legs = new_exercise_type("Legs");
        let press = exercise_for(&chest.id, "Press");
        let squat = exercise_for(&legs.id, "Squat");
        let push = new_routine(CreateRoutineInput {
            name: "Push".into(),
            exercise_type_ids: vec![chest.id.clone(), legs.id.clone()],
        });
        let lower = new_routine(CreateRoutineInput {
            name: "Lower".into(),
            exercise_type_ids: vec![legs.id.clone()],
        });

        let result = remove_exercise_type(
            &[chest.clone(), legs.clone()],
            &[press, squat.clone()],
            &[push.clone(), lower.clone()],
            &chest.id,
        );

        assert_eq!(result.exercise_types, vec![legs.clone()]);
        assert_eq!(result.exercises, vec![squat]);
        assert_eq!(result.routines[0].exercise_type_ids, vec![legs.id]);
        assert!(result.routines[0].updated_at >= push.updated_at);
        // Unaffected routines are returned unchanged.
        assert_eq!(result.routines[1], lower);
    }

    #[test]
    fn test_remove_routine_detaches_from_programs() {
        let a = new_routine(CreateRoutineInput {
            name: "A".into(),
            exercise_type_ids: vec![],
        });
        let b = new_routine(CreateRoutineInput {
            name: "B".into(),
            exercise_type_ids: vec![],
        });
        let split = new_program(CreateProgramInput {
            name: "Split".into(),
            routine_ids: vec![a.id.clone(), b.id.clone()],
        });
        let other = new_program(CreateProgramInput {
            name: "Other".into(),
            routine_ids: vec![b.id.clone()],
        });

        let result = remove_routine(&[a.clone(), b.clone()], &[split, other.clone()], &a.id);
        assert_eq!(result.routines, vec![b.clone()]);
        assert_eq!(result.programs[0].routine_ids, vec![b.id]);
        assert_eq!(result.programs[1], other);
    }
}
