//! # Error Reporter
//!
//! User-visible list of recent failures. Each error expires on its own timer
//! (default 5 s) unless cleared earlier.
//!
//! ```text
//!   add_error("Failed to save routines", ..)  ──► [err-1]
//!   add_error("Failed to load programs", ..)  ──► [err-1, err-2]
//!        ... ttl after err-1 was added ...    ──► [err-2]
//!        ... ttl after err-2 was added ...    ──► []
//! ```
//!
//! Expiry timers are tokio tasks, so errors must be added from within a
//! runtime.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::config::SyncSettings;

/// Default lifetime of a reported error.
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_millis(5000);

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    pub id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Shared, observable error list. Clones share the same list.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    errors: Arc<watch::Sender<Vec<AppError>>>,
    ttl: Duration,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_ERROR_TTL)
    }
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter whose errors live for the configured `error_ttl_ms`.
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self::with_ttl(settings.error_ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (errors, _) = watch::channel(Vec::new());
        ErrorReporter {
            errors: Arc::new(errors),
            ttl,
        }
    }

    /// Records an error and schedules its removal. Returns the error id.
    pub fn add_error(&self, message: impl Into<String>, details: Option<String>) -> String {
        let error = AppError {
            id: format!("error-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            details,
            timestamp: Utc::now(),
        };
        let id = error.id.clone();
        debug!(id = %id, message = %error.message, "Error reported");

        self.errors.send_modify(|errors| errors.push(error));

        // Deadline is fixed now, not when the timer task first runs.
        let deadline = tokio::time::Instant::now() + self.ttl;
        let errors = Arc::clone(&self.errors);
        let expired = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            remove(&errors, &expired);
        });

        id
    }

    /// Removes one error. Returns false if it was already gone.
    pub fn clear_error(&self, id: &str) -> bool {
        remove(&self.errors, id)
    }

    pub fn clear_all_errors(&self) {
        self.errors.send_if_modified(|errors| {
            let had_any = !errors.is_empty();
            errors.clear();
            had_any
        });
    }

    /// Current errors, oldest first.
    pub fn errors(&self) -> Vec<AppError> {
        self.errors.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AppError>> {
        self.errors.subscribe()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn remove(errors: &watch::Sender<Vec<AppError>>, id: &str) -> bool {
    errors.send_if_modified(|errors| {
        let before = errors.len();
        errors.retain(|error| error.id != id);
        errors.len() != before
    })
}
