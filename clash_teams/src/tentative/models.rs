//! Tentative queue data models.

use crate::team::{PlayerId, Team};
use crate::tournament::TournamentKey;
use serde::{Deserialize, Serialize};

/// Players waiting for a team on one server and tournament.
///
/// Order is insertion order and only matters for display. An empty queue is
/// never stored; the record is deleted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TentativeQueue {
    /// Game server
    pub server: String,
    /// Tournament the players are waiting for
    pub tournament: TournamentKey,
    /// Waiting players, unique
    pub players: Vec<PlayerId>,
}

impl TentativeQueue {
    /// Create an empty queue
    pub fn new(server: impl Into<String>, tournament: TournamentKey) -> Self {
        Self {
            server: server.into(),
            tournament,
            players: Vec::new(),
        }
    }

    /// Append a player unless already waiting (builder style)
    pub fn with_player(mut self, player_id: impl Into<PlayerId>) -> Self {
        self.push(player_id);
        self
    }

    /// Append a player unless already waiting; returns whether it was added
    pub fn push(&mut self, player_id: impl Into<PlayerId>) -> bool {
        let player_id = player_id.into();
        if self.contains(&player_id) {
            return false;
        }
        self.players.push(player_id);
        true
    }

    /// Remove a player; returns whether they were waiting
    pub fn remove(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != player_id);
        self.players.len() != before
    }

    /// Whether the player is waiting
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    /// Number of waiting players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody is waiting
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Where a player stands for one tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// Holds a seat on this team
    OnTeam(Team),
    /// Waiting on this queue
    Tentative(TentativeQueue),
    /// Neither seated nor waiting
    Unassigned,
}

/// Result of toggling a player on a tentative queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TentativeOutcome {
    /// Player was appended; the queue as stored
    Added(TentativeQueue),
    /// Player was removed; `None` once the emptied queue was deleted
    Removed(Option<TentativeQueue>),
}

impl TentativeOutcome {
    /// Queue record after the toggle, if one still exists
    pub fn queue(&self) -> Option<&TentativeQueue> {
        match self {
            TentativeOutcome::Added(queue) => Some(queue),
            TentativeOutcome::Removed(queue) => queue.as_ref(),
        }
    }
}
