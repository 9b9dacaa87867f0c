//! # Logging
//!
//! Subscriber setup plus the [`Logger`] handle passed to sync components.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  main()                                                                 │
//! │    ├── init_tracing()            once, installs the fmt subscriber      │
//! │    └── Logger::root("gym")       explicit value, no global state        │
//! │          │                                                              │
//! │          ├── .child("exercises") ──► EntityStore / SyncQueue            │
//! │          ├── .child("routines")  ──► EntityStore / SyncQueue            │
//! │          └── .child("remote")    ──► RemoteRepository                   │
//! │                                                                         │
//! │  Every event carries `context = "gym/exercises"` as a structured field. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RUST_LOG` overrides the default filter (`info,gym_sync=debug,gym_store=info,sqlx=warn`).

use std::fmt;
use std::sync::Arc;
use tracing::Span;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,gym_sync=debug,gym_store=info,sqlx=warn";

/// Installs the global `tracing` subscriber.
///
/// Returns false if a subscriber was already installed (tests, embedding
/// applications), in which case the existing one is kept.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Context-carrying logging handle.
///
/// Cheap to clone. Created once at process start and handed down; components
/// derive narrower contexts with [`Logger::child`].
#[derive(Clone, PartialEq, Eq)]
pub struct Logger {
    context: Arc<str>,
}

impl Logger {
    /// Top-level logger for an application.
    pub fn root(context: &str) -> Self {
        Logger {
            context: Arc::from(context),
        }
    }

    /// Derives a logger whose context is `<parent>/<context>`.
    pub fn child(&self, context: &str) -> Self {
        Logger {
            context: Arc::from(format!("{}/{}", self.context, context)),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Span to instrument spawned tasks with.
    pub fn span(&self) -> Span {
        tracing::info_span!("gym", context = %self.context)
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(context = %self.context, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(context = %self.context, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(context = %self.context, "{message}");
    }

    pub fn error(&self, message: &str, error: &dyn fmt::Display) {
        tracing::error!(context = %self.context, error = %error, "{message}");
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Logger").field(&self.context).finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::root("gym")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_valid_and_documented() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(include_str!("logging.rs").contains(&format!("default filter (`{DEFAULT_FILTER}`)")));
    }

    #[test]
    fn test_child_context_is_nested() {
        let root = Logger::root("gym");
        let store = root.child("exercises");
        assert_eq!(store.context(), "gym/exercises");
        assert_eq!(store.child("queue").context(), "gym/exercises/queue");
        assert_eq!(root.context(), "gym");
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        assert!(!init_tracing());
        Logger::default().info("still logging");
    }
}
