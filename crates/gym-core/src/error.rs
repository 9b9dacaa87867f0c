//! # Error Types
//!
//! Domain-specific error types for gym-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gym-core errors (this file)                                           │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Field rule violations                          │
//! │  └── RepoError        - Uniform failure signal of every Repository     │
//! │                                                                         │
//! │  gym-store errors                                                      │
//! │  └── StoreError       - SQLite / JSON failures (→ RepoError)           │
//! │                                                                         │
//! │  gym-sync errors                                                       │
//! │  └── SyncError        - Load / Sync / Auth / Config failures           │
//! │                                                                         │
//! │  Flow: StoreError / HTTP error → RepoError → SyncError → ErrorReporter │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity referenced by id does not exist in the collection.
    #[error("{collection} entry not found: {id}")]
    EntityNotFound { collection: String, id: String },

    /// Entity could not be converted to or from its JSON form.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Repository Error
// =============================================================================

/// Failure signal returned by every [`Repository`](crate::Repository)
/// implementation.
///
/// Backends translate their own errors (SQLite, HTTP, JSON) into one of these
/// variants before returning, so the sync layer never sees a backend type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// The addressed row does not exist (or is not visible to the caller).
    #[error("{collection} item not found: {id}")]
    NotFound { collection: String, id: String },

    /// No authenticated identity could be resolved for a write.
    #[error("Not authenticated: {0}")]
    Auth(String),

    /// Local storage failed (database, disk).
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Network transport failed before a response was received.
    #[error("Network failure: {0}")]
    Network(String),

    /// Payload could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The backend answered but refused the request.
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl RepoError {
    /// Creates a NotFound error for a collection and id.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        RepoError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns true if the failure is caused by a missing identity.
    pub fn is_auth(&self) -> bool {
        matches!(self, RepoError::Auth(_))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_repo_error_display() {
        let err = RepoError::not_found("exercises", "abc-123");
        assert_eq!(err.to_string(), "exercises item not found: abc-123");
        assert!(!err.is_auth());
        assert!(RepoError::Auth("no session".into()).is_auth());
    }
}
