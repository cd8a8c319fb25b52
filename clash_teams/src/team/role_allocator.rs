//! Seat allocation for role-aware (version 2) teams.
//!
//! A v2 team is open for a request when the requested role is vacant and a
//! seat is free. Role changes travel in the same conditional write as the
//! roster change, so a roster entry and its role can never be split by a
//! concurrent writer.

use super::errors::{TeamError, TeamResult};
use super::models::{Role, Team, TeamVersion};
use super::names::{TeamNameGenerator, create_named_team};
use super::partition::{PlanTarget, TeamPartition};
use super::seats::{leave_tentative, release_after_placement, release_seat};
use crate::config::EngineConfig;
use crate::store::{RosterUpdate, TeamStore, TentativeStore, VersionFilter};
use crate::tournament::TournamentKey;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a role-aware registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleRegistration {
    /// Team the player was placed on, `None` when nothing was written
    pub registered_team: Option<Team>,
    /// Teams the player was released from after placement
    pub unregistered_teams: Vec<Team>,
    /// Teams the player is stuck on when no placement was possible
    pub existing_teams: Vec<Team>,
}

impl RoleRegistration {
    /// Whether the request was a no-op
    pub fn already_exists(&self) -> bool {
        self.registered_team.is_none()
    }
}

/// Seat allocator for role-aware teams
#[derive(Clone)]
pub struct RoleAllocator {
    teams: Arc<dyn TeamStore>,
    queues: Arc<dyn TentativeStore>,
    names: Arc<dyn TeamNameGenerator>,
    config: EngineConfig,
}

impl RoleAllocator {
    /// Create a new role allocator
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

    fn v2_filter() -> VersionFilter {
        VersionFilter::from(TeamVersion::V2)
    }

    /// Place a player in `role` on any team of the first suitable candidate
    /// tournament, creating a new team when none has the role vacant.
    ///
    /// A player alone on their current team for a candidate is stuck there;
    /// the role they hold is not considered. If every candidate is stuck the
    /// stuck teams are returned in `existing_teams` and nothing is written.
    ///
    /// # Errors
    ///
    /// * `TeamError::NoCandidateTournaments` - `candidates` is empty
    /// * `TeamError::Store` - Scan or placement write failed
    pub async fn register_player_to_new_team_v2(
        &self,
        player_id: &str,
        role: Role,
        server: &str,
        candidates: &[TournamentKey],
    ) -> TeamResult<RoleRegistration> {
        if candidates.is_empty() {
            return Err(TeamError::NoCandidateTournaments);
        }

        let capacity = self.config.team_capacity;
        let teams = self.teams.list_teams(server, Self::v2_filter()).await?;
        let partition = TeamPartition::build(teams, player_id, |team| {
            team.has_open_role(role) && !team.is_full(capacity)
        });
        let plan = partition.plan(candidates);

        let Some(target) = plan.target else {
            log::debug!(
                "Player {} already sole occupant for every candidate on {}",
                player_id,
                server
            );
            return Ok(RoleRegistration {
                existing_teams: plan.stuck,
                ..RoleRegistration::default()
            });
        };
        let tournament = target.tournament().clone();

        let team = match target {
            PlanTarget::Join(open) => {
                self.teams
                    .update_roster(
                        &open.key(),
                        RosterUpdate::add(player_id)
                            .with_role(role)
                            .within_capacity(capacity),
                        &open.name,
                    )
                    .await?
            }
            PlanTarget::Create(tournament) => {
                create_named_team(self.teams.as_ref(), self.names.as_ref(), |name| {
                    Team::new_v2(name, server, tournament.clone())
                        .with_player_in_role(player_id, role)
                })
                .await?
            }
        };
        log::info!(
            "Registered {} as {} on team {}",
            player_id,
            role,
            team.key()
        );

        let mut unregistered_teams = Vec::new();
        if let Some(prior) = plan.prior {
            unregistered_teams.extend(
                release_after_placement(
                    self.teams.as_ref(),
                    &prior,
                    RosterUpdate::remove(player_id).releasing_roles(),
                    self.config.empty_team_policy,
                )
                .await,
            );
        }
        leave_tentative(self.queues.as_ref(), server, &tournament, player_id).await;

        Ok(RoleRegistration {
            registered_team: Some(team),
            unregistered_teams,
            existing_teams: plan.stuck,
        })
    }

    /// Place a player in `role` on the team named `team_name`.
    ///
    /// Every rule is checked against the scanned record before a write is
    /// issued. A player already on the team in another role switches roles
    /// in one conditional update. Seats held on other teams of the same
    /// tournament are released afterwards, best effort.
    ///
    /// # Errors
    ///
    /// * `TeamError::TeamNotFound` - No v2 team with that name in `tournaments`
    /// * `TeamError::AlreadyInRole` - Player already plays `role` there
    /// * `TeamError::RoleTaken` - Another player holds `role`
    /// * `TeamError::CapacityExceeded` - Player is not on the team and it is full
    /// * `TeamError::Store` - Scan or placement write failed
    pub async fn register_with_specific_team_v2(
        &self,
        player_id: &str,
        role: Role,
        server: &str,
        tournaments: &[TournamentKey],
        team_name: &str,
    ) -> TeamResult<RoleRegistration> {
        let capacity = self.config.team_capacity;
        let teams = self.teams.list_teams(server, Self::v2_filter()).await?;

        let target = teams
            .iter()
            .find(|team| team.name == team_name && tournaments.contains(&team.tournament))
            .ok_or_else(|| TeamError::TeamNotFound {
                team_name: team_name.to_string(),
                server: server.to_string(),
            })?;

        match target.role_holder(role) {
            Some(holder) if holder == player_id => {
                return Err(TeamError::AlreadyInRole {
                    role,
                    team_name: team_name.to_string(),
                });
            }
            Some(_) => {
                return Err(TeamError::RoleTaken {
                    role,
                    team_name: team_name.to_string(),
                });
            }
            None => {}
        }

        if !target.contains(player_id) && target.is_full(capacity) {
            return Err(TeamError::CapacityExceeded {
                team_name: team_name.to_string(),
                capacity,
            });
        }

        let team = self
            .teams
            .update_roster(
                &target.key(),
                RosterUpdate::add(player_id)
                    .with_role(role)
                    .within_capacity(capacity),
                &target.name,
            )
            .await?;
        log::info!(
            "Registered {} as {} on team {}",
            player_id,
            role,
            team.key()
        );

        let mut unregistered_teams = Vec::new();
        for prior in teams.iter().filter(|other| {
            other.tournament == target.tournament
                && other.name != target.name
                && other.contains(player_id)
        }) {
            unregistered_teams.extend(
                release_after_placement(
                    self.teams.as_ref(),
                    prior,
                    RosterUpdate::remove(player_id).releasing_roles(),
                    self.config.empty_team_policy,
                )
                .await,
            );
        }
        leave_tentative(self.queues.as_ref(), server, &target.tournament, player_id).await;

        Ok(RoleRegistration {
            registered_team: Some(team),
            unregistered_teams,
            existing_teams: Vec::new(),
        })
    }

    /// Remove a player and their role from every v2 team in `tournaments`.
    ///
    /// Fails on the first rejected update; earlier releases stand.
    pub async fn unregister_player_v2(
        &self,
        player_id: &str,
        server: &str,
        tournaments: &[TournamentKey],
    ) -> TeamResult<Vec<Team>> {
        let teams = self.teams.list_teams(server, Self::v2_filter()).await?;

        let mut released = Vec::new();
        for team in teams
            .iter()
            .filter(|team| team.contains(player_id) && tournaments.contains(&team.tournament))
        {
            released.push(
                release_seat(
                    self.teams.as_ref(),
                    team,
                    RosterUpdate::remove(player_id).releasing_roles(),
                    self.config.empty_team_policy,
                )
                .await?,
            );
        }

        Ok(released)
    }
}
