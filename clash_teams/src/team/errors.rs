//! Team allocation error types.

use super::models::Role;
use crate::store::StoreError;
use thiserror::Error;

/// Team allocation errors
#[derive(Debug, Error)]
pub enum TeamError {
    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Caller supplied no tournaments to choose from
    #[error("No candidate tournaments supplied")]
    NoCandidateTournaments,

    /// Named team does not exist for any requested tournament
    #[error("Team '{team_name}' not found on {server}")]
    TeamNotFound { team_name: String, server: String },

    /// Role already filled by another player
    #[error("Role {role} is already taken on team '{team_name}'")]
    RoleTaken { role: Role, team_name: String },

    /// Every seat on the team is taken
    #[error("Team '{team_name}' is full ({capacity} seats)")]
    CapacityExceeded { team_name: String, capacity: usize },

    /// Player already holds this role on this team; nothing to do
    #[error("Player already plays {role} on team '{team_name}'")]
    AlreadyInRole { role: Role, team_name: String },
}

impl TeamError {
    /// Domain rule violations detected before any write was issued
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TeamError::RoleTaken { .. }
                | TeamError::CapacityExceeded { .. }
                | TeamError::AlreadyInRole { .. }
        )
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            TeamError::Store(e) => e.client_message(),
            // Don't echo server names back
            TeamError::TeamNotFound { team_name, .. } => format!("Team '{team_name}' not found"),
            _ => self.to_string(),
        }
    }
}

/// Result type for team allocation operations
pub type TeamResult<T> = Result<T, TeamError>;
