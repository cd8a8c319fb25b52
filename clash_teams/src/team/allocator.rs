//! Seat allocation for undifferentiated (unversioned) teams.

use super::errors::{TeamError, TeamResult};
use super::models::{PlayerId, Team};
use super::names::{TeamNameGenerator, create_named_team};
use super::partition::{PlanTarget, TeamPartition};
use super::seats::{leave_tentative, release_after_placement, release_seat};
use crate::config::EngineConfig;
use crate::store::{RosterUpdate, TeamStore, TentativeStore, VersionFilter};
use crate::tournament::TournamentKey;
use std::sync::Arc;

/// Result of a registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Player now holds a seat on this team
    Registered(Team),
    /// Player is stuck on these teams for every candidate; nothing was written
    Existing(Vec<Team>),
}

impl Placement {
    /// Whether the request was a no-op
    pub fn already_exists(&self) -> bool {
        matches!(self, Placement::Existing(_))
    }

    /// Team the player was placed on, if any
    pub fn registered_team(&self) -> Option<&Team> {
        match self {
            Placement::Registered(team) => Some(team),
            Placement::Existing(_) => None,
        }
    }
}

/// Seat allocator for unversioned teams
#[derive(Clone)]
pub struct TeamAllocator {
    teams: Arc<dyn TeamStore>,
    queues: Arc<dyn TentativeStore>,
    names: Arc<dyn TeamNameGenerator>,
    config: EngineConfig,
}

impl TeamAllocator {
    /// Create a new allocator
    pub fn new(
        teams: Arc<dyn TeamStore>,
        queues: Arc<dyn TentativeStore>,
        names: Arc<dyn TeamNameGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            teams,
            queues,
            names,
            config,
        }
    }

    /// Place a player on a team for the first suitable candidate tournament
    ///
    /// # Arguments
    ///
    /// * `player_id` - Player requesting a seat
    /// * `server` - Game server
    /// * `candidates` - Tournaments in order of preference
    ///
    /// # Returns
    ///
    /// * `Placement::Registered` - Team the player now sits on
    /// * `Placement::Existing` - Player is the sole occupant of a team for
    ///   every candidate; no write was issued
    ///
    /// # Errors
    ///
    /// * `TeamError::NoCandidateTournaments` - `candidates` is empty
    /// * `TeamError::Store` - Scan or placement write failed. A failure while
    ///   releasing the previous seat is logged, not returned.
    pub async fn register_player(
        &self,
        player_id: &str,
        server: &str,
        candidates: &[TournamentKey],
    ) -> TeamResult<Placement> {
        if candidates.is_empty() {
            return Err(TeamError::NoCandidateTournaments);
        }

        let capacity = self.config.team_capacity;
        let teams = self
            .teams
            .list_teams(server, VersionFilter::Unversioned)
            .await?;
        let partition = TeamPartition::build(teams, player_id, |team| !team.is_full(capacity));
        let plan = partition.plan(candidates);

        let Some(target) = plan.target else {
            log::debug!(
                "Player {} already sole occupant for every candidate on {}",
                player_id,
                server
            );
            return Ok(Placement::Existing(plan.stuck));
        };
        let tournament = target.tournament().clone();

        let team = match target {
            PlanTarget::Join(open) => {
                self.teams
                    .update_roster(
                        &open.key(),
                        RosterUpdate::add(player_id).within_capacity(capacity),
                        &open.name,
                    )
                    .await?
            }
            PlanTarget::Create(tournament) => {
                create_named_team(self.teams.as_ref(), self.names.as_ref(), |name| {
                    Team::new_v1(name, server, tournament.clone()).with_player(player_id)
                })
                .await?
            }
        };
        log::info!("Registered {} on team {}", player_id, team.key());

        if let Some(prior) = plan.prior {
            release_after_placement(
                self.teams.as_ref(),
                &prior,
                RosterUpdate::remove(player_id),
                self.config.empty_team_policy,
            )
            .await;
        }
        leave_tentative(self.queues.as_ref(), server, &tournament, player_id).await;

        Ok(Placement::Registered(team))
    }

    /// Remove a player from their seat in each of `tournaments`.
    ///
    /// Updates are issued one by one and the first failure is returned;
    /// releases that already committed are not undone.
    pub async fn unregister_player(
        &self,
        player_id: &str,
        server: &str,
        tournaments: &[TournamentKey],
    ) -> TeamResult<Vec<Team>> {
        let teams = self
            .teams
            .list_teams(server, VersionFilter::Unversioned)
            .await?;

        let mut released = Vec::new();
        for team in teams
            .iter()
            .filter(|team| team.contains(player_id) && tournaments.contains(&team.tournament))
        {
            released.push(
                release_seat(
                    self.teams.as_ref(),
                    team,
                    RosterUpdate::remove(player_id),
                    self.config.empty_team_policy,
                )
                .await?,
            );
        }

        Ok(released)
    }

    /// Players seated with `player_id`, per tournament, on unversioned teams
    pub async fn teammates(
        &self,
        player_id: &str,
        server: &str,
    ) -> TeamResult<Vec<(TournamentKey, Vec<PlayerId>)>> {
        let teams = self
            .teams
            .list_teams(server, VersionFilter::Unversioned)
            .await?;

        Ok(teams
            .into_iter()
            .filter(|team| team.contains(player_id))
            .map(|team| {
                let others = team
                    .roster
                    .iter()
                    .filter(|p| p.as_str() != player_id)
                    .cloned()
                    .collect();
                (team.tournament, others)
            })
            .collect())
    }
}
