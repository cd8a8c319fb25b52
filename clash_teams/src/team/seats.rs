//! Seat release steps shared by the allocators and the tentative manager.
//!
//! Moves are not atomic across records: the player is placed first and the
//! old seat is released afterwards. A failed release is logged and the
//! placement stands.

use crate::config::EmptyTeamPolicy;
use crate::store::{RosterUpdate, StoreResult, TeamStore, TentativeStore};
use crate::team::models::Team;
use crate::tournament::TournamentKey;

/// Conditionally remove the player described by `update` from `team`,
/// deleting the record afterwards if it emptied and the policy says so.
pub(crate) async fn release_seat(
    store: &dyn TeamStore,
    team: &Team,
    update: RosterUpdate,
    policy: EmptyTeamPolicy,
) -> StoreResult<Team> {
    let player_id = update.player_id().to_string();
    let released = store.update_roster(&team.key(), update, &team.name).await?;
    log::info!("Released {} from team {}", player_id, released.key());

    if released.is_empty() && policy == EmptyTeamPolicy::Delete {
        // The release already committed; a failed delete only leaves a shell
        match store.delete_team(&released.key(), &released.name).await {
            Ok(true) => log::info!("Deleted empty team {}", released.key()),
            Ok(false) => log::info!(
                "Kept team {}: refilled or renamed before it could be deleted",
                released.key()
            ),
            Err(e) => log::warn!("Failed to delete empty team {}: {}", released.key(), e),
        }
    }

    Ok(released)
}

/// Release step of a move. Never fails the caller.
pub(crate) async fn release_after_placement(
    store: &dyn TeamStore,
    team: &Team,
    update: RosterUpdate,
    policy: EmptyTeamPolicy,
) -> Option<Team> {
    let player_id = update.player_id().to_string();
    match release_seat(store, team, update, policy).await {
        Ok(released) => Some(released),
        Err(e) => {
            log::warn!(
                "Failed to release {} from team {} after placement: {}",
                player_id,
                team.key(),
                e
            );
            None
        }
    }
}

/// Take the player off the tentative queue of a tournament they were just
/// seated for. Never fails the caller.
pub(crate) async fn leave_tentative(
    queues: &dyn TentativeStore,
    server: &str,
    tournament: &TournamentKey,
    player_id: &str,
) {
    match queues.get_queue(server, tournament).await {
        Ok(Some(queue)) if queue.contains(player_id) => {
            match queues.remove_from_queue(server, tournament, player_id).await {
                Ok(_) => log::info!(
                    "Removed {} from tentative queue {}#{}",
                    player_id,
                    server,
                    tournament
                ),
                Err(e) => log::warn!(
                    "Failed to remove {} from tentative queue {}#{}: {}",
                    player_id,
                    server,
                    tournament,
                    e
                ),
            }
        }
        Ok(_) => {}
        Err(e) => log::warn!(
            "Failed to read tentative queue {}#{}: {}",
            server,
            tournament,
            e
        ),
    }
}
