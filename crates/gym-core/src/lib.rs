//! # gym-core: Pure Domain Logic for Gym Tracker
//!
//! This crate holds everything about workout data that can be expressed
//! without touching a disk, a socket or a clock-driven runtime.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Gym Tracker Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 gym-sync (EntityStore, SyncQueue)               │   │
//! │  │      set(next) ──► diff ──► Repository ──► rollback / report    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gym-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  entity   │  │   delta   │  │ equality  │  │repository │  │   │
//! │  │   │  types    │  │  Snapshot │  │ deep_equal│  │  contract │  │   │
//! │  │   │  factory  │  │   diff    │  │  instants │  │  RepoError│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        gym-store (local)   /   gym-sync::remote (REST)          │   │
//! │  │              implementations of the Repository trait            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`entity`] - The `Entity` trait and the five collection kinds
//! - [`types`] - Domain records (exercise types, exercises, routines, ...)
//! - [`delta`] - Snapshots and the minimal create/update/delete diff
//! - [`equality`] - Structural equality that treats equal instants as equal
//! - [`naming`] - Memoized in-memory ↔ storage field-name tables
//! - [`repository`] - The asynchronous CRUD contract every backend implements
//! - [`factory`] - Entity constructors and collection helpers
//! - [`cascade`] - Referential clean-up when a parent record is deleted
//! - [`workout`] - Volume and duration calculations
//! - [`validation`] - Field rules shared by every entry point
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use gym_core::delta::{diff, Snapshot};
//! use gym_core::factory::new_exercise_type;
//!
//! let bench = new_exercise_type("Bench Press");
//! let snapshot = Snapshot::new();
//!
//! let delta = diff(&snapshot, &[bench.clone()]);
//! assert_eq!(delta.to_create, vec![bench]);
//! assert!(delta.to_update.is_empty());
//! assert!(delta.to_delete.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cascade;
pub mod delta;
pub mod entity;
pub mod equality;
pub mod error;
pub mod factory;
pub mod naming;
pub mod repository;
pub mod types;
pub mod validation;
pub mod workout;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use delta::{diff, Delta, Snapshot};
pub use entity::{CollectionKind, Entity};
pub use error::{CoreError, CoreResult, RepoError, RepoResult, ValidationError};
pub use repository::Repository;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default namespace prefix for local storage keys (`<namespace>:<collection>`).
pub const DEFAULT_NAMESPACE: &str = "gym-tracker";

/// Maximum length of a user-facing name (exercise, routine, program...).
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a target rep range such as `"8-12"`.
pub const MAX_REP_RANGE_LEN: usize = 20;

/// Upper bound for reps-in-reserve values.
pub const MAX_RIR: u32 = 10;
