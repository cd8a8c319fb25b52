//! Tournament directory lookups.
//!
//! The directory resolves a name/day filter to the tournaments that still
//! accept sign-ups. Callers use it to build the candidate list handed to the
//! allocators; the allocators never consult it themselves.

use super::models::Tournament;
use crate::store::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of currently valid tournaments
#[async_trait]
pub trait TournamentDirectory: Send + Sync {
    /// Find tournaments that have not started yet, optionally filtered by
    /// name and day
    async fn find_valid_tournaments(
        &self,
        name: Option<&str>,
        day: Option<&str>,
    ) -> StoreResult<Vec<Tournament>>;
}

/// In-memory tournament schedule
#[derive(Debug, Clone, Default)]
pub struct TournamentCalendar {
    tournaments: Vec<Tournament>,
}

impl TournamentCalendar {
    /// Create a calendar from a list of tournaments
    pub fn new(tournaments: Vec<Tournament>) -> Self {
        Self { tournaments }
    }

    /// Add a tournament to the schedule
    pub fn with_tournament(mut self, tournament: Tournament) -> Self {
        self.tournaments.push(tournament);
        self
    }

    /// Tournaments valid at `now` matching the filter, earliest start first
    pub fn valid_at(
        &self,
        now: DateTime<Utc>,
        name: Option<&str>,
        day: Option<&str>,
    ) -> Vec<Tournament> {
        let mut valid: Vec<Tournament> = self
            .tournaments
            .iter()
            .filter(|t| t.is_valid_at(now))
            .filter(|t| name.is_none_or(|n| t.name == n))
            .filter(|t| day.is_none_or(|d| t.day == d))
            .cloned()
            .collect();

        valid.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        valid
    }
}

#[async_trait]
impl TournamentDirectory for TournamentCalendar {
    async fn find_valid_tournaments(
        &self,
        name: Option<&str>,
        day: Option<&str>,
    ) -> StoreResult<Vec<Tournament>> {
        Ok(self.valid_at(Utc::now(), name, day))
    }
}
