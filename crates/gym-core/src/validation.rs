//! # Validation Module
//!
//! Field rules for user-supplied records.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller builds entity (factory)                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE: entity.validate()?      ◄── rejects before set()          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  EntityStore::set ──► SyncQueue ──► Repository                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sync layer never validates; it persists whatever it is given.
//!
//! ## Usage
//! ```rust
//! use gym_core::validation::{validate_name, Validate};
//! use gym_core::factory::new_exercise_type;
//!
//! assert!(validate_name("Bench Press").is_ok());
//! assert!(validate_name("   ").is_err());
//! assert!(new_exercise_type("Squat").validate().is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{Exercise, ExerciseLog, ExerciseType, Program, Routine, SetLog, WorkoutSession};
use crate::{MAX_NAME_LEN, MAX_REP_RANGE_LEN, MAX_RIR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Implemented by every record that has field rules.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Field Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a user-facing name (1 to 100 characters after trimming).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates an optional machine brand (at most 100 characters).
pub fn validate_machine_brand(brand: Option<&str>) -> ValidationResult<()> {
    match brand {
        Some(brand) if brand.chars().count() > MAX_NAME_LEN => Err(ValidationError::TooLong {
            field: "machineBrand".to_string(),
            max: MAX_NAME_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a target rep range such as `"8-12"` (1 to 20 characters).
pub fn validate_rep_range(range: &str) -> ValidationResult<()> {
    validate_text("targetRepRange", range, MAX_REP_RANGE_LEN)
}

/// Validates a reps-in-reserve value (0 to 10).
pub fn validate_rir(field: &str, rir: Option<u32>) -> ValidationResult<()> {
    match rir {
        Some(value) if value > MAX_RIR => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_RIR),
        }),
        _ => Ok(()),
    }
}

/// Validates that a weight is a finite, non-negative number.
pub fn validate_weight(weight: f64) -> ValidationResult<()> {
    if !weight.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "weight".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if weight < 0.0 {
        return Err(ValidationError::Negative {
            field: "weight".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Rules
// =============================================================================

impl Validate for ExerciseType {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)
    }
}

impl Validate for Exercise {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)?;
        validate_machine_brand(self.machine_brand.as_deref())?;
        validate_rep_range(&self.target_rep_range)?;
        validate_rir("targetRepsInReserve", self.target_reps_in_reserve)?;
        if self.exercise_type_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "exerciseTypeId".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for Routine {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)
    }
}

impl Validate for Program {
    fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)
    }
}

impl Validate for SetLog {
    fn validate(&self) -> ValidationResult<()> {
        validate_weight(self.weight)?;
        validate_rir("rir", self.rir)
    }
}

impl Validate for ExerciseLog {
    fn validate(&self) -> ValidationResult<()> {
        self.sets.iter().try_for_each(Validate::validate)
    }
}

impl Validate for WorkoutSession {
    fn validate(&self) -> ValidationResult<()> {
        if self.routine_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "routineId".to_string(),
            });
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                return Err(ValidationError::InvalidFormat {
                    field: "endTime".to_string(),
                    reason: "must not be before startTime".to_string(),
                });
            }
        }
        self.exercise_logs.iter().try_for_each(Validate::validate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{new_exercise, new_set_log, new_workout_session, CreateExerciseInput};

    fn input() -> CreateExerciseInput {
        CreateExerciseInput {
            name: "Leg Press".into(),
            machine_brand: None,
            target_rep_range: "8-12".into(),
            target_reps_in_reserve: Some(2),
            exercise_type_id: "type-1".into(),
        }
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_name("A").is_ok());
        assert!(validate_name(&"a".repeat(100)).is_ok());
        assert!(matches!(
            validate_name(&"a".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
        assert!(matches!(validate_name(""), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_exercise_rules() {
        assert!(new_exercise(input()).validate().is_ok());

        let mut too_long_range = input();
        too_long_range.target_rep_range = "1".repeat(21);
        assert!(new_exercise(too_long_range).validate().is_err());

        let mut bad_rir = input();
        bad_rir.target_reps_in_reserve = Some(11);
        assert_eq!(
            new_exercise(bad_rir).validate(),
            Err(ValidationError::OutOfRange {
                field: "targetRepsInReserve".into(),
                min: 0,
                max: 10
            })
        );

        let mut long_brand = input();
        long_brand.machine_brand = Some("b".repeat(101));
        assert!(new_exercise(long_brand).validate().is_err());
    }

    #[test]
    fn test_set_log_rules() {
        assert!(new_set_log(0.0, 0, None).validate().is_ok());
        assert!(matches!(
            new_set_log(-2.5, 5, None).validate(),
            Err(ValidationError::Negative { .. })
        ));
        assert!(new_set_log(f64::NAN, 5, None).validate().is_err());
    }

    #[test]
    fn test_session_end_before_start_is_rejected() {
        let mut session = new_workout_session("r-1", None);
        session.end_time = Some(session.start_time - chrono::TimeDelta::minutes(1));
        assert!(session.validate().is_err());
    }
}
