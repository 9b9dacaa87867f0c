//! # Sync Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Persistence    │  │  Configuration  │  │  Backend                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Load           │  │  InvalidConfig  │  │  Network                │ │
//! │  │  Sync           │  │  ConfigLoad…    │  │  Repository             │ │
//! │  │  Auth           │  │  ConfigSave…    │  │  Storage                │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Load`, `Sync` and `Auth` form the user-facing taxonomy: every failure the
//! sync layer reports to the [`ErrorReporter`](crate::reporter::ErrorReporter)
//! is classified as one of them first.

use gym_core::{CollectionKind, RepoError};
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Initial `get_all` of a collection failed. The collection stays empty
    /// and nothing retries automatically.
    #[error("Failed to load {collection}: {source}")]
    Load {
        collection: CollectionKind,
        #[source]
        source: RepoError,
    },

    /// A write batch failed; the collection was rolled back.
    #[error("Failed to save {collection}: {source}")]
    Sync {
        collection: CollectionKind,
        #[source]
        source: RepoError,
    },

    /// A remote write was attempted without an authenticated identity.
    #[error("Authentication required: {0}")]
    Auth(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// HTTP client could not be built or a request could not be sent.
    #[error("Network error: {0}")]
    Network(String),

    /// Local store could not be opened.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Any other repository failure.
    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}

impl SyncError {
    /// Classifies a failed write. Missing identity becomes [`SyncError::Auth`].
    pub fn from_write(collection: CollectionKind, err: RepoError) -> Self {
        match err {
            RepoError::Auth(message) => SyncError::Auth(message),
            source => SyncError::Sync { collection, source },
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<gym_store::StoreError> for SyncError {
    fn from(err: gym_store::StoreError) -> Self {
        SyncError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}
