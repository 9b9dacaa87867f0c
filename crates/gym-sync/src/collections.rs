//! # Collections
//!
//! The five stores of the application, opened against one backend and one
//! error reporter.
//!
//! Each store syncs independently: a failure in one collection never blocks
//! or rolls back another. Operations spanning several collections (cascade
//! deletes) compute every next state up front and then `set()` each store.

use chrono::{DateTime, Utc};
use tokio::join;

use gym_core::cascade::{remove_exercise_type, remove_routine};
use gym_core::factory::{new_workout_session, remove_from, update_in};
use gym_core::validation::ValidationResult;
use gym_core::workout::finish;
use gym_core::{Exercise, ExerciseType, Program, Routine, WorkoutSession};

use crate::backend::Backend;
use crate::error::SyncError;
use crate::logging::Logger;
use crate::reporter::ErrorReporter;
use crate::store::EntityStore;

pub struct Collections {
    pub exercise_types: EntityStore<ExerciseType>,
    pub exercises: EntityStore<Exercise>,
    pub routines: EntityStore<Routine>,
    pub programs: EntityStore<Program>,
    pub workout_sessions: EntityStore<WorkoutSession>,
    reporter: ErrorReporter,
}

impl Collections {
    /// Creates every store against `backend`. Nothing is fetched until
    /// [`load_all`](Self::load_all). Must be called inside a Tokio runtime.
    pub fn open(backend: &Backend, reporter: ErrorReporter, logger: &Logger) -> Self {
        Collections {
            exercise_types: EntityStore::new(backend.repository(), reporter.clone(), logger),
            exercises: EntityStore::new(backend.repository(), reporter.clone(), logger),
            routines: EntityStore::new(backend.repository(), reporter.clone(), logger),
            programs: EntityStore::new(backend.repository(), reporter.clone(), logger),
            workout_sessions: EntityStore::new(backend.repository(), reporter.clone(), logger),
            reporter,
        }
    }

    /// Loads all collections concurrently. Returns the failures; collections
    /// that loaded are usable regardless.
    pub async fn load_all(&self) -> Vec<SyncError> {
        let (types, exercises, routines, programs, sessions) = join!(
            self.exercise_types.load(),
            self.exercises.load(),
            self.routines.load(),
            self.programs.load(),
            self.workout_sessions.load(),
        );

        [types, exercises, routines, programs, sessions]
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    /// Resolves once every collection has finished syncing.
    pub async fn settled(&self) {
        join!(
            self.exercise_types.settled(),
            self.exercises.settled(),
            self.routines.settled(),
            self.programs.settled(),
            self.workout_sessions.settled(),
        );
    }

    pub fn is_loading(&self) -> bool {
        self.exercise_types.is_loading()
            || self.exercises.is_loading()
            || self.routines.is_loading()
            || self.programs.is_loading()
            || self.workout_sessions.is_loading()
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Deletes an exercise type, its exercises, and its routine slots.
    pub fn delete_exercise_type(&self, id: &str) {
        let removal = remove_exercise_type(
            &self.exercise_types.get(),
            &self.exercises.get(),
            &self.routines.get(),
            id,
        );
        self.exercise_types.set(removal.exercise_types);
        self.exercises.set(removal.exercises);
        self.routines.set(removal.routines);
    }

    /// Deletes a routine and detaches it from every program.
    pub fn delete_routine(&self, id: &str) {
        let removal = remove_routine(&self.routines.get(), &self.programs.get(), id);
        self.routines.set(removal.routines);
        self.programs.set(removal.programs);
    }

    /// Starts a new session for `routine_id` and stores it right away.
    pub fn start_workout(
        &self,
        routine_id: &str,
        program_id: Option<String>,
    ) -> ValidationResult<WorkoutSession> {
        self.workout_sessions
            .insert(new_workout_session(routine_id, program_id))
    }

    /// Discards the active session without recording it. Returns the
    /// removed session, or `None` if no workout was in progress.
    pub fn cancel_workout(&self) -> Option<WorkoutSession> {
        let active = self.active_workout()?;
        self.workout_sessions
            .modify(|sessions| remove_from(sessions, &active.id));
        Some(active)
    }

    /// Ends the session `id` at `end`, filling in duration and volume.
    ///
    /// Returns the finished session, or `None` if no session has that id.
    pub fn finish_workout(&self, id: &str, end: DateTime<Utc>) -> Option<WorkoutSession> {
        let sessions = self.workout_sessions.get();
        let finished = finish(sessions.iter().find(|session| session.id == id)?, end);
        let next = finished.clone();
        self.workout_sessions
            .set(update_in(&sessions, id, |_| next));
        Some(finished)
    }

    /// The session that has been started but not finished, if any.
    pub fn active_workout(&self) -> Option<WorkoutSession> {
        self.workout_sessions
            .get()
            .iter()
            .find(|session| session.is_active())
            .cloned()
    }
}
