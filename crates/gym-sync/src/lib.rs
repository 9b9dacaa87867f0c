//! # gym-sync: Optimistic Persistence for Gym Tracker
//!
//! Keeps in-memory collections responsive while a durable backend catches up.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Optimistic Write Path                           │
//! │                                                                         │
//! │  caller ── set(next) ──► EntityStore ── visible state updated at once   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                         SyncQueue (one per collection)                  │
//! │                              │  Idle ──► Syncing, latest payload wins   │
//! │                              ▼                                          │
//! │                  diff(snapshot, next) ──► Delta                         │
//! │                              │                                          │
//! │                              ▼                                          │
//! │         Backend::Local (SQLite)  |  Backend::Remote (REST + identity)   │
//! │                              │                                          │
//! │               ┌──────────────┴──────────────┐                           │
//! │               ▼ ok                          ▼ err                       │
//! │        snapshot ← next          RollbackManager.restore(snapshot)       │
//! │                                 ErrorReporter.add_error(..)  (5 s TTL)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `EntityStore`, the optimistic collection
//! - [`queue`] - `SyncQueue`, single-flight latest-wins writer
//! - [`rollback`] - Restores visible state after a failed write
//! - [`reporter`] - Self-expiring user-visible error list
//! - [`backend`] - Local / remote backend chosen once from configuration
//! - [`remote`] - REST repository scoped by the caller's identity
//! - [`auth`] - Session token and identity resolution
//! - [`collections`] - The five application stores and cross-collection edits
//! - [`config`] - Storage configuration (file + environment)
//! - [`logging`] - Subscriber setup and the explicit `Logger`
//! - [`memory`] - In-memory repository with failure injection
//! - [`error`] - Sync error types
//!
//! ## Example
//! ```rust,no_run
//! use gym_sync::{init_tracing, Backend, Collections, ErrorReporter, Logger, StorageConfig};
//! use gym_core::factory::new_exercise_type;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing();
//! let logger = Logger::root("gym");
//! let config = StorageConfig::load_or_default(None);
//! let (backend, _warning) = Backend::connect(&config, &logger).await?;
//!
//! let collections = Collections::open(&backend, ErrorReporter::from_settings(&config.sync), &logger);
//! collections.load_all().await;
//! collections.exercise_types.insert(new_exercise_type("Bench Press"))?;
//! collections.settled().await;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod backend;
pub mod collections;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod queue;
pub mod remote;
pub mod reporter;
pub mod rollback;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{Identity, IdentityProvider, SessionAuth};
pub use backend::Backend;
pub use collections::Collections;
pub use config::{BackendKind, ConfigWarning, StorageConfig};
pub use error::{SyncError, SyncResult};
pub use logging::{init_tracing, Logger};
pub use memory::{MemoryRepository, RepoCall, RepoOp};
pub use queue::{SyncPhase, SyncQueue};
pub use remote::{RemoteClient, RemoteRepository};
pub use reporter::{AppError, ErrorReporter};
pub use rollback::RollbackManager;
pub use store::EntityStore;
