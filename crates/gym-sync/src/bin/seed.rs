//! # Seed Data Generator
//!
//! Populates the configured backend with a starter training setup.
//!
//! ## Usage
//! ```bash
//! # Seed the backend selected by storage.toml / environment
//! cargo run -p gym-sync --bin seed
//!
//! # Use a specific config file
//! cargo run -p gym-sync --bin seed -- --config ./storage.toml
//!
//! # Remote backend: writes need a signed-in session
//! GYM_STORAGE_BACKEND=remote cargo run -p gym-sync --bin seed -- --token <access token>
//! ```
//!
//! ## Generated Data
//! - Exercise types: the main barbell and bodyweight movements
//! - Exercises: one or two variations per type, some on branded machines
//! - Routines: push, pull and legs days
//! - Program: "Push Pull Legs" referencing the three routines
//!
//! Writes go through the regular stores, so they are diffed, batched and
//! reported exactly like application writes.

use std::env;
use std::path::PathBuf;

use gym_core::factory::{
    new_exercise, new_exercise_type, new_program, new_routine, CreateExerciseInput,
    CreateProgramInput, CreateRoutineInput,
};
use gym_core::ExerciseType;
use gym_sync::{init_tracing, Backend, Collections, ErrorReporter, Logger, StorageConfig};

/// Exercise types with their variations: (name, machine brand, rep range, RIR).
const CATALOG: &[(&str, &[(&str, Option<&str>, &str, Option<u32>)])] = &[
    (
        "Bench Press",
        &[
            ("Barbell Bench Press", None, "5-8", Some(2)),
            ("Chest Press Machine", Some("Hammer Strength"), "8-12", Some(1)),
        ],
    ),
    (
        "Overhead Press",
        &[("Standing Overhead Press", None, "5-8", Some(2))],
    ),
    (
        "Pull-up",
        &[
            ("Weighted Pull-up", None, "5-8", Some(2)),
            ("Lat Pulldown", Some("Life Fitness"), "10-12", Some(1)),
        ],
    ),
    ("Barbell Row", &[("Pendlay Row", None, "6-10", Some(2))]),
    (
        "Squat",
        &[
            ("Back Squat", None, "4-6", Some(2)),
            ("Hack Squat", Some("Cybex"), "8-12", Some(1)),
        ],
    ),
    ("Deadlift", &[("Conventional Deadlift", None, "3-5", Some(3))]),
];

/// Routines as (name, exercise type names).
const ROUTINES: &[(&str, &[&str])] = &[
    ("Push Day", &["Bench Press", "Overhead Press"]),
    ("Pull Day", &["Pull-up", "Barbell Row"]),
    ("Leg Day", &["Squat", "Deadlift"]),
];

fn type_ids(types: &[ExerciseType], names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter_map(|name| types.iter().find(|t| t.name == *name))
        .map(|t| t.id.clone())
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut token: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--token" | "-t" => {
                if i + 1 < args.len() {
                    token = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gym Tracker Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Storage config file (default: platform config dir)");
                println!("  -t, --token <TOKEN>  Access token for the remote backend");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();
    let logger = Logger::root("seed");

    let config = StorageConfig::load(config_path)?;
    let (backend, warning) = Backend::connect(&config, &logger).await?;

    println!("🌱 Gym Tracker Seed Data Generator");
    println!("==================================");
    println!("Backend:   {}", backend.kind());
    println!("Namespace: {}", config.namespace());
    if let Some(warning) = warning {
        println!("⚠ {}", warning);
    }
    println!();

    if let (Some(auth), Some(token)) = (backend.auth(), token) {
        auth.set_access_token(token).await;
        println!("✓ Session token installed");
    }

    let reporter = ErrorReporter::from_settings(&config.sync);
    let collections = Collections::open(&backend, reporter.clone(), &logger);

    let failures = collections.load_all().await;
    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("✗ {}", failure);
        }
        return Err(format!("{} collections failed to load", failures.len()).into());
    }
    println!("✓ Collections loaded");

    if !collections.exercise_types.get().is_empty() {
        println!(
            "⚠ Backend already has {} exercise types",
            collections.exercise_types.get().len()
        );
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    // Exercise types and their exercises
    let mut types = Vec::new();
    let mut exercise_count = 0;
    for (type_name, variations) in CATALOG {
        let exercise_type = collections.exercise_types.insert(new_exercise_type(*type_name))?;
        for (name, brand, rep_range, rir) in variations.iter() {
            collections.exercises.insert(new_exercise(CreateExerciseInput {
                name: name.to_string(),
                machine_brand: brand.map(str::to_string),
                target_rep_range: rep_range.to_string(),
                target_reps_in_reserve: *rir,
                exercise_type_id: exercise_type.id.clone(),
            }))?;
            exercise_count += 1;
        }
        types.push(exercise_type);
    }
    println!("✓ {} exercise types, {} exercises", types.len(), exercise_count);

    // Routines and the program tying them together
    let mut routine_ids = Vec::new();
    for (name, type_names) in ROUTINES {
        let routine = collections.routines.insert(new_routine(CreateRoutineInput {
            name: name.to_string(),
            exercise_type_ids: type_ids(&types, type_names),
        }))?;
        routine_ids.push(routine.id);
    }
    collections.programs.insert(new_program(CreateProgramInput {
        name: "Push Pull Legs".to_string(),
        routine_ids,
    }))?;
    println!("✓ {} routines, 1 program", ROUTINES.len());

    collections.settled().await;

    let errors = reporter.errors();
    if errors.is_empty() {
        println!();
        println!("✅ Seed complete");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("✗ {}: {}", error.message, error.details.as_deref().unwrap_or(""));
        }
        Err(format!("{} writes failed", errors.len()).into())
    }
}
