//! Per-tournament grouping of scanned teams and the candidate walk.
//!
//! Both allocators scan every team on a server once, group them by
//! `tournament-name#tournament-day`, and then walk the caller's candidate
//! tournaments against that map. The walk is pure so it can be checked
//! without a store.

use super::models::Team;
use crate::tournament::TournamentKey;
use std::collections::HashMap;

/// Teams of one tournament, seen from one player's point of view
#[derive(Debug, Clone, Default)]
pub struct TournamentSlot {
    /// Team already holding the player's seat
    pub current: Option<Team>,
    /// Teams the player could join, excluding `current`
    pub open: Vec<Team>,
}

impl TournamentSlot {
    /// Open team to join: empty shells first, then partial rosters in scan order
    pub fn preferred_open_team(&self) -> Option<&Team> {
        self.open
            .iter()
            .find(|team| team.is_empty())
            .or_else(|| self.open.first())
    }
}

/// Where the walk decided to place the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanTarget {
    /// Join this existing team
    Join(Team),
    /// Create a new team for this tournament
    Create(TournamentKey),
}

impl PlanTarget {
    /// Tournament the player ends up in
    pub fn tournament(&self) -> &TournamentKey {
        match self {
            PlanTarget::Join(team) => &team.tournament,
            PlanTarget::Create(tournament) => tournament,
        }
    }
}

/// Outcome of walking the candidate tournaments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Placement, `None` when the player is stuck everywhere
    pub target: Option<PlanTarget>,
    /// Seat to release once placed, in the target tournament
    pub prior: Option<Team>,
    /// Teams the player is stuck on, in candidate order
    pub stuck: Vec<Team>,
}

/// Teams on one server keyed by tournament
#[derive(Debug, Clone, Default)]
pub struct TeamPartition {
    player_id: String,
    slots: HashMap<String, TournamentSlot>,
}

impl TeamPartition {
    /// Group `teams` by tournament for `player_id`. Teams for which
    /// `is_open` returns false are dropped unless they hold the player.
    pub fn build<F>(teams: Vec<Team>, player_id: &str, is_open: F) -> Self
    where
        F: Fn(&Team) -> bool,
    {
        let mut slots: HashMap<String, TournamentSlot> = HashMap::new();

        for team in teams {
            let slot = slots.entry(team.tournament.partition_key()).or_default();

            if team.contains(player_id) {
                match &slot.current {
                    None => slot.current = Some(team),
                    Some(current) => log::warn!(
                        "Player {} holds seats on both '{}' and '{}' for {}",
                        player_id,
                        current.name,
                        team.name,
                        team.tournament
                    ),
                }
            } else if is_open(&team) {
                slot.open.push(team);
            }
        }

        Self {
            player_id: player_id.to_string(),
            slots,
        }
    }

    /// Slot for one tournament
    pub fn slot(&self, tournament: &TournamentKey) -> Option<&TournamentSlot> {
        self.slots.get(&tournament.partition_key())
    }

    /// Team holding the player's seat for one tournament
    pub fn current_team(&self, tournament: &TournamentKey) -> Option<&Team> {
        self.slot(tournament).and_then(|slot| slot.current.as_ref())
    }

    /// Number of tournaments with at least one team
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no team was scanned
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Walk `candidates` in order and pick the first tournament where the
    /// player is not stuck.
    ///
    /// A player is stuck when they are the sole occupant of their current
    /// team: that tournament is skipped and the team is reported back instead.
    pub fn plan(&self, candidates: &[TournamentKey]) -> AllocationPlan {
        let mut stuck = Vec::new();

        for tournament in candidates {
            let slot = self.slot(tournament);
            let current = slot.and_then(|slot| slot.current.as_ref());

            if let Some(current) = current.filter(|team| team.is_sole_occupant(&self.player_id)) {
                stuck.push(current.clone());
                continue;
            }

            let target = match slot.and_then(TournamentSlot::preferred_open_team) {
                Some(open) => PlanTarget::Join(open.clone()),
                None => PlanTarget::Create(tournament.clone()),
            };

            return AllocationPlan {
                target: Some(target),
                prior: current.cloned(),
                stuck,
            };
        }

        AllocationPlan {
            target: None,
            prior: None,
            stuck,
        }
    }
}
