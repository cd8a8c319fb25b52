//! Team data models.

use crate::tournament::TournamentKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Player identifier type
pub type PlayerId = String;

/// Default number of seats on a team
pub const DEFAULT_TEAM_CAPACITY: usize = 5;

/// Position a player fills on a role-aware team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jg,
    Mid,
    Bot,
    Supp,
}

impl Role {
    /// Every role, in lane order
    pub const ALL: [Role; 5] = [Role::Top, Role::Jg, Role::Mid, Role::Bot, Role::Supp];

    /// Label stored in role maps
    pub fn label(self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jg => "Jg",
            Role::Mid => "Mid",
            Role::Bot => "Bot",
            Role::Supp => "Supp",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role label that matches no known role
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// Role label to the player filling it
pub type RoleMap = BTreeMap<Role, PlayerId>;

/// Record format discriminator.
///
/// Undifferentiated-seat teams carry no version marker; role-aware teams carry
/// `2`. Both formats live in the same store during the migration, so every
/// scan filters on the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamVersion {
    /// Flat roster, no roles
    V1,
    /// Roster plus role map
    V2,
}

impl TeamVersion {
    /// Marker stored on the record
    pub fn marker(self) -> Option<i32> {
        match self {
            TeamVersion::V1 => None,
            TeamVersion::V2 => Some(2),
        }
    }

    /// Parse a stored marker; unknown markers yield `None`
    pub fn from_marker(marker: Option<i32>) -> Option<Self> {
        match marker {
            None => Some(TeamVersion::V1),
            Some(2) => Some(TeamVersion::V2),
            Some(_) => None,
        }
    }
}

/// Composite store key of a team: `team-name#server#tournament-name#tournament-day`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamKey(String);

impl TeamKey {
    /// Build the key from its parts
    pub fn new(team_name: &str, server: &str, tournament: &TournamentKey) -> Self {
        Self(format!(
            "{}#{}#{}#{}",
            team_name, server, tournament.name, tournament.day
        ))
    }

    /// Get the raw key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A team signed up for one tournament day on one server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name, part of the store key
    pub name: String,
    /// Game server (region) the team plays on
    pub server: String,
    /// Tournament the team is bound to
    pub tournament: TournamentKey,
    /// Players holding a seat
    pub roster: BTreeSet<PlayerId>,
    /// Role assignments, role-aware teams only
    pub role_map: Option<RoleMap>,
    /// Record format
    pub version: TeamVersion,
}

impl Team {
    /// Create an empty undifferentiated-seat team
    pub fn new_v1(
        name: impl Into<String>,
        server: impl Into<String>,
        tournament: TournamentKey,
    ) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            tournament,
            roster: BTreeSet::new(),
            role_map: None,
            version: TeamVersion::V1,
        }
    }

    /// Create an empty role-aware team
    pub fn new_v2(
        name: impl Into<String>,
        server: impl Into<String>,
        tournament: TournamentKey,
    ) -> Self {
        Self {
            role_map: Some(RoleMap::new()),
            version: TeamVersion::V2,
            ..Self::new_v1(name, server, tournament)
        }
    }

    /// Seat a player (builder style, no role)
    pub fn with_player(mut self, player_id: impl Into<PlayerId>) -> Self {
        self.roster.insert(player_id.into());
        self
    }

    /// Seat a player in a role (builder style)
    pub fn with_player_in_role(mut self, player_id: impl Into<PlayerId>, role: Role) -> Self {
        let player_id = player_id.into();
        self.roster.insert(player_id.clone());
        self.role_map
            .get_or_insert_with(RoleMap::new)
            .insert(role, player_id);
        self
    }

    /// Store key, always derived from the current name and binding
    pub fn key(&self) -> TeamKey {
        TeamKey::new(&self.name, &self.server, &self.tournament)
    }

    /// Rename the team. The store key changes with it.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Bind the team to another tournament. The store key changes with it.
    pub fn rebind(&mut self, tournament: TournamentKey) {
        self.tournament = tournament;
    }

    /// Number of occupied seats
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Whether no seat is occupied
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Whether the player holds a seat
    pub fn contains(&self, player_id: &str) -> bool {
        self.roster.contains(player_id)
    }

    /// Whether every seat is taken
    pub fn is_full(&self, capacity: usize) -> bool {
        self.roster.len() >= capacity
    }

    /// Whether `player_id` is alone on the team
    pub fn is_sole_occupant(&self, player_id: &str) -> bool {
        self.contains(player_id) && self.roster.len() <= 1
    }

    /// Player filling `role`, if any
    pub fn role_holder(&self, role: Role) -> Option<&PlayerId> {
        self.role_map.as_ref().and_then(|roles| roles.get(&role))
    }

    /// Role held by the player, if any
    pub fn role_of(&self, player_id: &str) -> Option<Role> {
        self.role_map.as_ref().and_then(|roles| {
            roles
                .iter()
                .find(|(_, holder)| holder.as_str() == player_id)
                .map(|(role, _)| *role)
        })
    }

    /// A team without a role map, or whose map lacks `role`, has that slot open
    pub fn has_open_role(&self, role: Role) -> bool {
        self.role_holder(role).is_none()
    }

    /// Check the record invariants: roster within capacity, every role held
    /// by a rostered player, no player holding two roles
    pub fn is_consistent(&self, capacity: usize) -> bool {
        if self.roster.len() > capacity {
            return false;
        }

        match &self.role_map {
            None => true,
            Some(roles) => {
                let holders: BTreeSet<&PlayerId> = roles.values().collect();
                holders.len() == roles.len() && holders.iter().all(|p| self.roster.contains(*p))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msi_day_one() -> TournamentKey {
        TournamentKey::new("msi", "1")
    }

    #[test]
    fn test_key_tracks_rename_and_rebind() {
        let mut team = Team::new_v1("Pikachu", "NA1", msi_day_one());
        assert_eq!(team.key().as_str(), "Pikachu#NA1#msi#1");

        team.rename("Raichu");
        assert_eq!(team.key().as_str(), "Raichu#NA1#msi#1");

        team.rebind(TournamentKey::new("msi", "2"));
        assert_eq!(team.key().as_str(), "Raichu#NA1#msi#2");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("top".parse::<Role>().unwrap(), Role::Top);
        assert_eq!("SUPP".parse::<Role>().unwrap(), Role::Supp);
        assert_eq!(Role::Jg.to_string(), "Jg");
        assert!("Carry".parse::<Role>().is_err());
    }

    #[test]
    fn test_version_markers() {
        assert_eq!(TeamVersion::V1.marker(), None);
        assert_eq!(TeamVersion::V2.marker(), Some(2));
        assert_eq!(TeamVersion::from_marker(None), Some(TeamVersion::V1));
        assert_eq!(TeamVersion::from_marker(Some(2)), Some(TeamVersion::V2));
        assert_eq!(TeamVersion::from_marker(Some(7)), None);
    }

    #[test]
    fn test_roster_is_a_set() {
        let team = Team::new_v1("Pikachu", "NA1", msi_day_one())
            .with_player("p1")
            .with_player("p1")
            .with_player("p2");

        assert_eq!(team.len(), 2);
        assert!(team.contains("p1"));
        assert!(!team.is_sole_occupant("p1"));
    }

    #[test]
    fn test_sole_occupant() {
        let team = Team::new_v1("Pikachu", "NA1", msi_day_one()).with_player("p1");
        assert!(team.is_sole_occupant("p1"));
        assert!(!team.is_sole_occupant("p2"));
    }

    #[test]
    fn test_open_roles() {
        let legacy = Team::new_v1("Pikachu", "NA1", msi_day_one()).with_player("p1");
        assert!(legacy.has_open_role(Role::Top), "No role map means every role is open");

        let team = Team::new_v2("Raichu", "NA1", msi_day_one()).with_player_in_role("A", Role::Top);
        assert!(!team.has_open_role(Role::Top));
        assert!(team.has_open_role(Role::Mid));
        assert_eq!(team.role_of("A"), Some(Role::Top));
        assert_eq!(team.role_holder(Role::Top).map(String::as_str), Some("A"));
    }

    #[test]
    fn test_consistency_checks() {
        let team = Team::new_v2("Raichu", "NA1", msi_day_one())
            .with_player_in_role("A", Role::Top)
            .with_player_in_role("B", Role::Mid);
        assert!(team.is_consistent(DEFAULT_TEAM_CAPACITY));

        let mut broken = team.clone();
        broken.roster.remove("B");
        assert!(!broken.is_consistent(DEFAULT_TEAM_CAPACITY));

        let mut double_role = team.clone();
        double_role
            .role_map
            .as_mut()
            .unwrap()
            .insert(Role::Bot, "A".to_string());
        assert!(!double_role.is_consistent(DEFAULT_TEAM_CAPACITY));

        assert!(!team.is_consistent(1));
    }
}
