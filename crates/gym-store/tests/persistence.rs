//! Local store behaviour across process restarts.

use gym_core::factory::{new_exercise_log, new_set_log, new_workout_session};
use gym_core::{ExerciseType, Repository, WorkoutSession};
use gym_store::{Database, StoreConfig};

#[tokio::test]
async fn test_collection_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gym.db");

    let mut session = new_workout_session("routine-1", None);
    let mut log = new_exercise_log("exercise-1", "type-1");
    log.sets.push(new_set_log(80.0, 6, Some(1)));
    session.exercise_logs.push(log);
    session.exercise_selections = Some([("0".to_string(), "exercise-1".to_string())].into());

    {
        let db = Database::new(StoreConfig::new(&path)).await.unwrap();
        db.collection::<WorkoutSession>("gym-tracker")
            .create(&session)
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::new(StoreConfig::new(&path)).await.unwrap();
    let loaded = db
        .collection::<WorkoutSession>("gym-tracker")
        .get_all()
        .await
        .unwrap();
    assert_eq!(loaded, vec![session]);
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let db = Database::new(StoreConfig::in_memory()).await.unwrap();
    let mine = db.collection::<ExerciseType>("alice");
    let theirs = db.collection::<ExerciseType>("bob");

    mine.create(&gym_core::factory::new_exercise_type("Squat"))
        .await
        .unwrap();

    assert_eq!(mine.get_all().await.unwrap().len(), 1);
    assert!(theirs.get_all().await.unwrap().is_empty());

    let keys = db.kv().keys("alice:").await.unwrap();
    assert_eq!(keys, vec!["alice:exercise-types".to_string()]);
}

#[tokio::test]
async fn test_stored_value_is_a_json_array() {
    let db = Database::new(StoreConfig::in_memory()).await.unwrap();
    let repo = db.collection::<ExerciseType>("gym-tracker");
    let bench = gym_core::factory::new_exercise_type("Bench");
    repo.create(&bench).await.unwrap();

    let raw = db.kv().get("gym-tracker:exercise-types").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], bench.id.as_str());
    assert!(rows[0]["createdAt"].is_string());
}
