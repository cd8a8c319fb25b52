//! Store access layer over the external keyed-record store.
//!
//! The store offers per-record conditional writes and nothing stronger, so
//! every roster or role-map mutation goes through
//! [`TeamStore::update_roster`], whose precondition is "the record still
//! carries the team name we read". A renamed or deleted team makes the write
//! fail with [`StoreError::PreconditionFailed`] instead of silently
//! overwriting someone else's seat.
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: in-process, used by tests and embedders
//! - [`PgTeamStore`] / [`PgTentativeStore`]: PostgreSQL via sqlx

use crate::team::{PlayerId, Role, RoleMap, Team, TeamKey, TeamVersion};
use crate::tentative::TentativeQueue;
use crate::tournament::TournamentKey;
use async_trait::async_trait;

pub mod errors;
pub mod memory;
pub mod postgres;

pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryStore, StoreOperation};
pub use postgres::{PgTeamStore, PgTentativeStore};

/// Filter on the record format discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFilter {
    /// Records without a version marker (undifferentiated seats)
    Unversioned,
    /// Records carrying exactly this marker
    Version(i32),
    /// Every record regardless of format
    Any,
}

impl VersionFilter {
    /// Whether a stored marker passes the filter
    pub fn matches(self, marker: Option<i32>) -> bool {
        match self {
            VersionFilter::Unversioned => marker.is_none(),
            VersionFilter::Version(version) => marker == Some(version),
            VersionFilter::Any => true,
        }
    }
}

impl From<TeamVersion> for VersionFilter {
    fn from(version: TeamVersion) -> Self {
        match version.marker() {
            None => VersionFilter::Unversioned,
            Some(marker) => VersionFilter::Version(marker),
        }
    }
}

/// Seat change carried by a roster update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterDelta {
    /// Set union with `{player}`
    Add(PlayerId),
    /// Set difference with `{player}`
    Remove(PlayerId),
}

/// Role-map change applied in the same write as the seat change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// Put the player in this role, clearing any other role they held.
    /// Guarded: the role must be vacant or already theirs.
    Assign(Role),
    /// Clear every role held by the player
    Release,
}

/// One conditional roster mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterUpdate {
    /// Seat change
    pub delta: RosterDelta,
    /// Optional role-map change
    pub role_change: Option<RoleChange>,
    /// Seat limit checked in the write when adding a new player
    pub capacity: Option<usize>,
}

impl RosterUpdate {
    /// Add a player to the roster
    pub fn add(player_id: impl Into<PlayerId>) -> Self {
        Self {
            delta: RosterDelta::Add(player_id.into()),
            role_change: None,
            capacity: None,
        }
    }

    /// Remove a player from the roster
    pub fn remove(player_id: impl Into<PlayerId>) -> Self {
        Self {
            delta: RosterDelta::Remove(player_id.into()),
            role_change: None,
            capacity: None,
        }
    }

    /// Also assign the player to `role`
    pub fn with_role(mut self, role: Role) -> Self {
        self.role_change = Some(RoleChange::Assign(role));
        self
    }

    /// Also clear the player's roles
    pub fn releasing_roles(mut self) -> Self {
        self.role_change = Some(RoleChange::Release);
        self
    }

    /// Reject the write if the team is already full
    pub fn within_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Player the update is about
    pub fn player_id(&self) -> &str {
        match &self.delta {
            RosterDelta::Add(player_id) | RosterDelta::Remove(player_id) => player_id,
        }
    }

    /// Check the write guards against `team` and apply the update in place.
    ///
    /// The team-name precondition is checked by the store before this is
    /// called; this covers the capacity and role-vacancy guards.
    pub fn apply(&self, team: &mut Team) -> StoreResult<()> {
        let player_id = self.player_id();

        if let (RosterDelta::Add(_), Some(capacity)) = (&self.delta, self.capacity) {
            if !team.contains(player_id) && team.is_full(capacity) {
                return Err(StoreError::PreconditionFailed(format!(
                    "{} is full ({capacity} seats)",
                    team.key()
                )));
            }
        }

        if let Some(RoleChange::Assign(role)) = self.role_change {
            if let Some(holder) = team.role_holder(role) {
                if holder != player_id {
                    return Err(StoreError::PreconditionFailed(format!(
                        "{} role {role} is taken",
                        team.key()
                    )));
                }
            }
        }

        match &self.delta {
            RosterDelta::Add(player_id) => {
                team.roster.insert(player_id.clone());
            }
            RosterDelta::Remove(player_id) => {
                team.roster.remove(player_id);
            }
        }

        match self.role_change {
            Some(RoleChange::Assign(role)) => {
                let roles = team.role_map.get_or_insert_with(RoleMap::new);
                roles.retain(|_, holder| holder.as_str() != player_id);
                roles.insert(role, player_id.to_string());
            }
            Some(RoleChange::Release) => {
                if let Some(roles) = team.role_map.as_mut() {
                    roles.retain(|_, holder| holder.as_str() != player_id);
                }
            }
            None => {}
        }

        Ok(())
    }
}

/// Access to team records
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Scan every team on `server` whose version marker passes `filter`
    async fn list_teams(&self, server: &str, filter: VersionFilter) -> StoreResult<Vec<Team>>;

    /// Fetch one team by key
    async fn get_team(&self, key: &TeamKey) -> StoreResult<Option<Team>>;

    /// Insert a new team; fails with `AlreadyExists` on key collision
    async fn create_team(&self, team: &Team) -> StoreResult<Team>;

    /// Conditionally apply `update`. Fails with `PreconditionFailed` unless
    /// the record exists, its team name equals `expected_team_name` and the
    /// update's guards hold. Returns the record as written.
    async fn update_roster(
        &self,
        key: &TeamKey,
        update: RosterUpdate,
        expected_team_name: &str,
    ) -> StoreResult<Team>;

    /// Remove a team record, but only while its roster is empty and its team
    /// name still equals `expected_team_name`. Returns whether a record was
    /// removed; a team that was refilled or renamed in the meantime is kept.
    async fn delete_team(&self, key: &TeamKey, expected_team_name: &str) -> StoreResult<bool>;
}

/// Access to tentative queue records
#[async_trait]
pub trait TentativeStore: Send + Sync {
    /// Fetch the queue for one server and tournament
    async fn get_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
    ) -> StoreResult<Option<TentativeQueue>>;

    /// Queues on `server` whose tournament name starts with `name_prefix`
    async fn query_queues(&self, server: &str, name_prefix: &str)
    -> StoreResult<Vec<TentativeQueue>>;

    /// Append a player, creating the record if needed. Idempotent.
    async fn add_to_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<TentativeQueue>;

    /// Remove a player. Returns `None` once the record was deleted because
    /// it became empty; fails with `NotFound` when no record exists.
    async fn remove_from_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<Option<TentativeQueue>>;
}
