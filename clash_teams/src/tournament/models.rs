//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one day of a multi-day tournament event.
///
/// Teams and tentative queues are bound to a key, never to a full
/// [`Tournament`] record, so the key is what flows through allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TournamentKey {
    /// Tournament name (e.g. `msi`)
    pub name: String,
    /// Tournament day (e.g. `1`)
    pub day: String,
}

impl TournamentKey {
    /// Create a new tournament key
    pub fn new(name: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            day: day.into(),
        }
    }

    /// Canonical `name#day` form used to group teams per tournament
    pub fn partition_key(&self) -> String {
        format!("{}#{}", self.name, self.day)
    }
}

impl fmt::Display for TournamentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.day)
    }
}

/// A scheduled tournament day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament name
    pub name: String,
    /// Tournament day
    pub day: String,
    /// When play starts; registration closes at this instant
    pub start_time: DateTime<Utc>,
    /// When sign-ups officially open
    pub registration_time: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament record
    pub fn new(
        name: impl Into<String>,
        day: impl Into<String>,
        start_time: DateTime<Utc>,
        registration_time: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            day: day.into(),
            start_time,
            registration_time,
        }
    }

    /// Key used to bind teams and queues to this tournament
    pub fn key(&self) -> TournamentKey {
        TournamentKey::new(self.name.clone(), self.day.clone())
    }

    /// A tournament accepts allocation only until it starts
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.start_time
    }
}
