//! Tentative queue operations.

use super::errors::{TentativeError, TentativeResult};
use super::models::{Association, TentativeOutcome, TentativeQueue};
use crate::config::EngineConfig;
use crate::store::{RosterUpdate, StoreError, TeamStore, TentativeStore, VersionFilter};
use crate::team::seats::release_after_placement;
use crate::tournament::TournamentKey;
use std::sync::Arc;

/// Tentative queue manager
#[derive(Clone)]
pub struct TentativeQueueManager {
    queues: Arc<dyn TentativeStore>,
    teams: Arc<dyn TeamStore>,
    config: EngineConfig,
}

impl TentativeQueueManager {
    /// Create a new tentative queue manager
    pub fn new(
        queues: Arc<dyn TentativeStore>,
        teams: Arc<dyn TeamStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            queues,
            teams,
            config,
        }
    }

    /// Toggle a player on the queue for one server and tournament
    ///
    /// # Arguments
    ///
    /// * `player_id` - Player to toggle
    /// * `server` - Game server
    /// * `tournament` - Tournament the queue belongs to
    ///
    /// # Returns
    ///
    /// * `TentativeOutcome::Removed` - Player was listed and is now gone;
    ///   carries `None` when the emptied record was deleted
    /// * `TentativeOutcome::Added` - Player was appended, record created if needed
    pub async fn handle_tentative(
        &self,
        player_id: &str,
        server: &str,
        tournament: &TournamentKey,
    ) -> TentativeResult<TentativeOutcome> {
        let queued = self
            .queues
            .get_queue(server, tournament)
            .await?
            .is_some_and(|queue| queue.contains(player_id));

        if queued {
            let remaining = self
                .remove_from_tentative(player_id, server, tournament)
                .await?;
            Ok(TentativeOutcome::Removed(remaining))
        } else {
            let queue = self.add_to_tentative(player_id, server, tournament).await?;
            Ok(TentativeOutcome::Added(queue))
        }
    }

    /// Append a player to the queue, creating it when missing.
    ///
    /// Any team seat the player holds for the same tournament is released
    /// afterwards. A failed release is logged and the queue entry stands.
    pub async fn add_to_tentative(
        &self,
        player_id: &str,
        server: &str,
        tournament: &TournamentKey,
    ) -> TentativeResult<TentativeQueue> {
        let queue = self
            .queues
            .add_to_queue(server, tournament, player_id)
            .await?;
        log::info!(
            "Added {} to tentative queue {}#{} ({} waiting)",
            player_id,
            server,
            tournament,
            queue.len()
        );

        match self.teams.list_teams(server, VersionFilter::Any).await {
            Ok(teams) => {
                for team in teams
                    .iter()
                    .filter(|team| team.tournament == *tournament && team.contains(player_id))
                {
                    release_after_placement(
                        self.teams.as_ref(),
                        team,
                        RosterUpdate::remove(player_id).releasing_roles(),
                        self.config.empty_team_policy,
                    )
                    .await;
                }
            }
            Err(e) => log::warn!(
                "Failed to scan teams of {} after queueing {}: {}",
                server,
                player_id,
                e
            ),
        }

        Ok(queue)
    }

    /// Remove a player from the queue. Returns `None` once the emptied
    /// record was deleted.
    pub async fn remove_from_tentative(
        &self,
        player_id: &str,
        server: &str,
        tournament: &TournamentKey,
    ) -> TentativeResult<Option<TentativeQueue>> {
        let remaining = self
            .queues
            .remove_from_queue(server, tournament, player_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => TentativeError::QueueNotFound {
                    server: server.to_string(),
                    tournament: tournament.clone(),
                },
                other => other.into(),
            })?;

        match &remaining {
            Some(queue) => log::info!(
                "Removed {} from tentative queue {}#{} ({} waiting)",
                player_id,
                server,
                tournament,
                queue.len()
            ),
            None => log::info!(
                "Removed {} from tentative queue {}#{}, queue deleted",
                player_id,
                server,
                tournament
            ),
        }

        Ok(remaining)
    }

    /// Where the player stands for one tournament
    pub async fn association(
        &self,
        player_id: &str,
        server: &str,
        tournament: &TournamentKey,
    ) -> TentativeResult<Association> {
        let teams = self.teams.list_teams(server, VersionFilter::Any).await?;
        if let Some(team) = teams
            .into_iter()
            .find(|team| team.tournament == *tournament && team.contains(player_id))
        {
            return Ok(Association::OnTeam(team));
        }

        Ok(match self.queues.get_queue(server, tournament).await? {
            Some(queue) if queue.contains(player_id) => Association::Tentative(queue),
            _ => Association::Unassigned,
        })
    }

    /// Tournaments whose name starts with `name_prefix` that the player is
    /// waiting on
    pub async fn tentative_tournaments(
        &self,
        player_id: &str,
        server: &str,
        name_prefix: &str,
    ) -> TentativeResult<Vec<TournamentKey>> {
        let queues = self.queues.query_queues(server, name_prefix).await?;

        Ok(queues
            .into_iter()
            .filter(|queue| queue.contains(player_id))
            .map(|queue| queue.tournament)
            .collect())
    }
}
