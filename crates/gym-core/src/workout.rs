//! Workout session calculations.

use chrono::{DateTime, Utc};

use crate::types::{ExerciseLog, WorkoutSession};

/// Total weight moved in a session: Σ weight × reps over every set.
pub fn total_volume(session: &WorkoutSession) -> f64 {
    session
        .exercise_logs
        .iter()
        .flat_map(|log| log.sets.iter())
        .map(|set| set.weight * f64::from(set.reps))
        .sum()
}

/// Minutes between two instants, rounded to the nearest whole minute.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}

/// Ends a session at `end`, filling in duration and volume.
pub fn finish(session: &WorkoutSession, end: DateTime<Utc>) -> WorkoutSession {
    WorkoutSession {
        end_time: Some(end),
        duration: Some(duration_minutes(session.start_time, end)),
        total_volume: Some(total_volume(session)),
        updated_at: end,
        ..session.clone()
    }
}

/// Most recent earlier performance of an exercise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousExercise<'a> {
    pub log: &'a ExerciseLog,
    /// When the session holding `log` was created.
    pub session_date: DateTime<Utc>,
}

/// Finds the newest session other than `current_session_id` in which
/// `exercise_id` was logged with at least one set.
///
/// Only the first log for the exercise in each session is considered. Among
/// sessions created at the same instant, the one listed first wins.
pub fn previous_exercise_log<'a>(
    exercise_id: &str,
    sessions: &'a [WorkoutSession],
    current_session_id: &str,
) -> Option<PreviousExercise<'a>> {
    sessions
        .iter()
        .rev()
        .filter(|session| session.id != current_session_id)
        .filter_map(|session| {
            let log = session
                .exercise_logs
                .iter()
                .find(|log| log.exercise_id == exercise_id)?;
            (!log.sets.is_empty()).then_some(PreviousExercise {
                log,
                session_date: session.created_at,
            })
        })
        .max_by_key(|previous| previous.session_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{new_exercise_log, new_set_log, new_workout_session};
    use chrono::TimeDelta;

    #[test]
    fn test_total_volume_sums_all_sets() {
        let mut session = new_workout_session("r-1", None);
        let mut press = new_exercise_log("ex-1", "t-1");
        press.sets.push(new_set_log(60.0, 10, Some(2)));
        press.sets.push(new_set_log(62.5, 8, None));
        let mut row = new_exercise_log("ex-2", "t-2");
        row.sets.push(new_set_log(40.0, 12, None));
        session.exercise_logs = vec![press, row];

        assert_eq!(total_volume(&session), 600.0 + 500.0 + 480.0);
    }

    #[test]
    fn test_empty_session_has_zero_volume() {
        let session = new_workout_session("r-1", None);
        assert_eq!(total_volume(&session), 0.0);
    }

    #[test]
    fn test_duration_rounds_to_nearest_minute() {
        let start = Utc::now();
        assert_eq!(duration_minutes(start, start + TimeDelta::seconds(89)), 1);
        assert_eq!(duration_minutes(start, start + TimeDelta::seconds(90)), 2);
        assert_eq!(duration_minutes(start, start + TimeDelta::minutes(45)), 45);
    }

    fn session_with(exercise_id: &str, sets: usize, days_ago: i64) -> WorkoutSession {
        let mut session = new_workout_session("r-1", None);
        session.created_at = session.created_at - TimeDelta::days(days_ago);
        let mut log = new_exercise_log(exercise_id, "t-1");
        for _ in 0..sets {
            log.sets.push(new_set_log(80.0, 8, Some(2)));
        }
        session.exercise_logs.push(log);
        session
    }

    #[test]
    fn test_previous_log_is_newest_other_session_with_sets() {
        let old = session_with("ex-1", 3, 14);
        let recent = session_with("ex-1", 2, 7);
        let skipped = session_with("ex-1", 0, 3);
        let other = session_with("ex-2", 4, 1);
        let current = session_with("ex-1", 1, 0);
        let sessions = vec![recent.clone(), old, current.clone(), skipped, other];

        let previous = previous_exercise_log("ex-1", &sessions, &current.id).unwrap();
        assert_eq!(previous.log, &recent.exercise_logs[0]);
        assert_eq!(previous.session_date, recent.created_at);
    }

    #[test]
    fn test_previous_log_missing() {
        let current = session_with("ex-1", 2, 0);
        let sessions = vec![current.clone(), session_with("ex-1", 0, 2)];

        assert!(previous_exercise_log("ex-1", &sessions, &current.id).is_none());
        assert!(previous_exercise_log("ex-9", &sessions, "none").is_none());
        assert!(previous_exercise_log("ex-1", &[], &current.id).is_none());
    }

    #[test]
    fn test_finish_sets_metrics() {
        let mut session = new_workout_session("r-1", Some("p-1".into()));
        let mut log = new_exercise_log("ex-1", "t-1");
        log.sets.push(new_set_log(100.0, 5, None));
        session.exercise_logs.push(log);

        let end = session.start_time + TimeDelta::minutes(50);
        let done = finish(&session, end);

        assert!(!done.is_active());
        assert_eq!(done.duration, Some(50));
        assert_eq!(done.total_volume, Some(500.0));
        assert_eq!(done.updated_at, end);
        assert_eq!(done.created_at, session.created_at);
    }
}
