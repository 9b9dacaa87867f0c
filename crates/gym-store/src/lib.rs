//! # gym-store: On-Device Storage for Gym Tracker
//!
//! The local backend. Each collection is stored as a single JSON array under
//! the key `<namespace>:<collection>` in a SQLite-backed key-value table.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gym Tracker Data Flow                            │
//! │                                                                         │
//! │  EntityStore::set(next) ──► SyncQueue ──► dyn Repository<T>            │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     gym-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ KvRepository   │    │ 001_kv_store │  │   │
//! │  │   │ SqlitePool    │◄───│ LocalRepository│    │              │  │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │                                │ codec.rs (dates, backfill)    │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  kv_store: "gym-tracker:exercises" → [{"id": ..., ...}, ...]    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`codec`] - Collection ↔ JSON text, date normalization and backfill
//! - [`error`] - Storage error types
//! - [`repository`] - Key-value and per-collection repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gym_core::{ExerciseType, Repository};
//! use gym_store::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::new("gym.db")).await?;
//! let repo = db.collection::<ExerciseType>("gym-tracker");
//! let all = repo.get_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, StoreConfig};

pub use repository::kv::KvRepository;
pub use repository::local::LocalRepository;
