//! Store error types.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the keyed-record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A record with the same key already exists
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Conditional write lost a race or a write guard did not hold
    #[error("Precondition failed for {0}")]
    PreconditionFailed(String),

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store call exceeded its timeout
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored record cannot be mapped onto the data model
    #[error("Corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
}

impl StoreError {
    /// Transport or backend failures. These are always propagated and never
    /// treated as a domain outcome.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_)
                | StoreError::Timeout(_)
                | StoreError::Database(_)
                | StoreError::CorruptRecord { .. }
        )
    }

    /// Whether a conditional write was rejected
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed(_))
    }

    /// Get a client-safe error message that doesn't leak backend details
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Database(_) | StoreError::CorruptRecord { .. } => {
                "Internal server error".to_string()
            }
            StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                "Service temporarily unavailable".to_string()
            }
            StoreError::PreconditionFailed(_) => {
                "Team changed while updating, please try again".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
