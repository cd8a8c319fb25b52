//! Tentative queue error types.

use crate::store::StoreError;
use crate::tournament::TournamentKey;
use thiserror::Error;

/// Tentative queue errors
#[derive(Debug, Error)]
pub enum TentativeError {
    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No queue record exists for the server and tournament
    #[error("No tentative queue for {tournament} on {server}")]
    QueueNotFound {
        server: String,
        tournament: TournamentKey,
    },
}

impl TentativeError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            TentativeError::Store(e) => e.client_message(),
            TentativeError::QueueNotFound { tournament, .. } => {
                format!("No tentative queue for {tournament}")
            }
        }
    }
}

/// Result type for tentative queue operations
pub type TentativeResult<T> = Result<T, TentativeError>;
