//! In-process store implementing both store traits.
//!
//! Every precondition the external store enforces is enforced here as well,
//! so allocation logic behaves the same against either. The write log and
//! fault switches exist for tests that need to observe write ordering or
//! simulate a concurrent writer.

use super::{RosterUpdate, StoreError, StoreResult, TeamStore, TentativeStore, VersionFilter};
use crate::team::{Team, TeamKey};
use crate::tentative::TentativeQueue;
use crate::tournament::TournamentKey;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A write issued against the store, in issue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    CreateTeam(TeamKey),
    UpdateRoster(TeamKey),
    DeleteTeam(TeamKey),
    AddToQueue(String, TournamentKey),
    RemoveFromQueue(String, TournamentKey),
}

type QueueKey = (String, TournamentKey);

#[derive(Default)]
struct MemoryState {
    teams: BTreeMap<TeamKey, Team>,
    queues: BTreeMap<QueueKey, TentativeQueue>,
    operations: Vec<StoreOperation>,
    conflicting_keys: HashSet<TeamKey>,
    unavailable: bool,
}

impl MemoryState {
    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

/// In-memory keyed-record store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a team (builder style, not logged as a write)
    pub fn with_team(self, team: Team) -> Self {
        self.state().teams.insert(team.key(), team);
        self
    }

    /// Preload a tentative queue (builder style, not logged as a write)
    pub fn with_queue(self, queue: TentativeQueue) -> Self {
        self.state()
            .queues
            .insert((queue.server.clone(), queue.tournament.clone()), queue);
        self
    }

    /// Snapshot of every stored team
    pub fn teams(&self) -> Vec<Team> {
        self.state().teams.values().cloned().collect()
    }

    /// Snapshot of one team
    pub fn team(&self, key: &TeamKey) -> Option<Team> {
        self.state().teams.get(key).cloned()
    }

    /// Snapshot of one queue
    pub fn queue(&self, server: &str, tournament: &TournamentKey) -> Option<TentativeQueue> {
        self.state()
            .queues
            .get(&(server.to_string(), tournament.clone()))
            .cloned()
    }

    /// Writes issued so far
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.state().operations.clone()
    }

    /// Forget the write log
    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    /// Make every conditional update on `key` fail as if another writer had
    /// renamed the team after it was read
    pub fn conflict_on(&self, key: &TeamKey) {
        self.state().conflicting_keys.insert(key.clone());
    }

    /// Simulate a backend outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn list_teams(&self, server: &str, filter: VersionFilter) -> StoreResult<Vec<Team>> {
        let state = self.state();
        state.check_available()?;

        Ok(state
            .teams
            .values()
            .filter(|team| team.server == server && filter.matches(team.version.marker()))
            .cloned()
            .collect())
    }

    async fn get_team(&self, key: &TeamKey) -> StoreResult<Option<Team>> {
        let state = self.state();
        state.check_available()?;
        Ok(state.teams.get(key).cloned())
    }

    async fn create_team(&self, team: &Team) -> StoreResult<Team> {
        let mut state = self.state();
        state.check_available()?;

        let key = team.key();
        state.operations.push(StoreOperation::CreateTeam(key.clone()));

        if state.teams.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        state.teams.insert(key, team.clone());
        Ok(team.clone())
    }

    async fn update_roster(
        &self,
        key: &TeamKey,
        update: RosterUpdate,
        expected_team_name: &str,
    ) -> StoreResult<Team> {
        let mut state = self.state();
        state.check_available()?;
        state.operations.push(StoreOperation::UpdateRoster(key.clone()));

        if state.conflicting_keys.contains(key) {
            return Err(StoreError::PreconditionFailed(key.to_string()));
        }

        let team = state
            .teams
            .get_mut(key)
            .filter(|team| team.name == expected_team_name)
            .ok_or_else(|| StoreError::PreconditionFailed(key.to_string()))?;

        // Apply to a copy so a failed guard leaves the record untouched
        let mut updated = team.clone();
        update.apply(&mut updated)?;
        *team = updated.clone();

        Ok(updated)
    }

    async fn delete_team(&self, key: &TeamKey, expected_team_name: &str) -> StoreResult<bool> {
        let mut state = self.state();
        state.check_available()?;
        state.operations.push(StoreOperation::DeleteTeam(key.clone()));

        let removable = state
            .teams
            .get(key)
            .is_some_and(|team| team.name == expected_team_name && team.is_empty());
        if removable {
            state.teams.remove(key);
        }
        Ok(removable)
    }
}

#[async_trait]
impl TentativeStore for MemoryStore {
    async fn get_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
    ) -> StoreResult<Option<TentativeQueue>> {
        let state = self.state();
        state.check_available()?;
        Ok(state
            .queues
            .get(&(server.to_string(), tournament.clone()))
            .cloned())
    }

    async fn query_queues(
        &self,
        server: &str,
        name_prefix: &str,
    ) -> StoreResult<Vec<TentativeQueue>> {
        let state = self.state();
        state.check_available()?;

        Ok(state
            .queues
            .values()
            .filter(|queue| queue.server == server && queue.tournament.name.starts_with(name_prefix))
            .cloned()
            .collect())
    }

    async fn add_to_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<TentativeQueue> {
        let mut state = self.state();
        state.check_available()?;
        state.operations.push(StoreOperation::AddToQueue(
            server.to_string(),
            tournament.clone(),
        ));

        let queue = state
            .queues
            .entry((server.to_string(), tournament.clone()))
            .or_insert_with(|| TentativeQueue::new(server, tournament.clone()));
        queue.push(player_id);
        Ok(queue.clone())
    }

    async fn remove_from_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<Option<TentativeQueue>> {
        let mut state = self.state();
        state.check_available()?;
        state.operations.push(StoreOperation::RemoveFromQueue(
            server.to_string(),
            tournament.clone(),
        ));

        let key = (server.to_string(), tournament.clone());
        let queue = state
            .queues
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{server}#{tournament}")))?;
        queue.remove(player_id);

        if queue.is_empty() {
            state.queues.remove(&key);
            return Ok(None);
        }
        Ok(Some(queue.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Role;

    fn msi(day: &str) -> TournamentKey {
        TournamentKey::new("msi", day)
    }

    #[tokio::test]
    async fn test_create_team_collision() {
        let store = MemoryStore::new();
        let team = Team::new_v1("Pikachu", "NA1", msi("1")).with_player("p1");

        store.create_team(&team).await.unwrap();
        let err = store.create_team(&team).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.get_team(&team.key()).await.unwrap(), Some(team));
    }

    #[tokio::test]
    async fn test_list_teams_filters_server_and_version() {
        let store = MemoryStore::new()
            .with_team(Team::new_v1("Pikachu", "NA1", msi("1")))
            .with_team(Team::new_v2("Raichu", "NA1", msi("1")))
            .with_team(Team::new_v1("Eevee", "EUW1", msi("1")));

        let v1 = store.list_teams("NA1", VersionFilter::Unversioned).await.unwrap();
        assert_eq!(v1.len(), 1);
        assert_eq!(v1[0].name, "Pikachu");

        let v2 = store.list_teams("NA1", VersionFilter::Version(2)).await.unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2[0].name, "Raichu");

        let all = store.list_teams("NA1", VersionFilter::Any).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_requires_matching_team_name() {
        let team = Team::new_v1("Pikachu", "NA1", msi("1")).with_player("p1");
        let store = MemoryStore::new().with_team(team.clone());

        let err = store
            .update_roster(&team.key(), RosterUpdate::add("p2"), "Raichu")
            .await
            .unwrap_err();
        assert!(err.is_precondition_failed());
        assert_eq!(store.team(&team.key()).unwrap().len(), 1);

        let updated = store
            .update_roster(&team.key(), RosterUpdate::add("p2"), "Pikachu")
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn test_update_on_deleted_team_fails() {
        let team = Team::new_v1("Pikachu", "NA1", msi("1"));
        let store = MemoryStore::new().with_team(team.clone());

        assert!(store.delete_team(&team.key(), "Pikachu").await.unwrap());
        assert!(!store.delete_team(&team.key(), "Pikachu").await.unwrap());

        let err = store
            .update_roster(&team.key(), RosterUpdate::add("p2"), "Pikachu")
            .await
            .unwrap_err();
        assert!(err.is_precondition_failed());
    }

    #[tokio::test]
    async fn test_delete_keeps_occupied_or_renamed_team() {
        let occupied = Team::new_v1("Pikachu", "NA1", msi("1")).with_player("p1");
        let renamed = Team::new_v1("Raichu", "NA1", msi("2"));
        let store = MemoryStore::new()
            .with_team(occupied.clone())
            .with_team(renamed.clone());

        assert!(!store.delete_team(&occupied.key(), "Pikachu").await.unwrap());
        assert!(!store.delete_team(&renamed.key(), "Pikachu").await.unwrap());

        assert!(store.team(&occupied.key()).unwrap().contains("p1"));
        assert!(store.team(&renamed.key()).is_some());
    }

    #[tokio::test]
    async fn test_failed_guard_leaves_record_untouched() {
        let team = Team::new_v2("Raichu", "NA1", msi("1")).with_player_in_role("A", Role::Top);
        let store = MemoryStore::new().with_team(team.clone());

        let err = store
            .update_roster(&team.key(), RosterUpdate::add("B").with_role(Role::Top), "Raichu")
            .await
            .unwrap_err();
        assert!(err.is_precondition_failed());
        assert_eq!(store.team(&team.key()).unwrap(), team);
    }

    #[tokio::test]
    async fn test_conflict_injection() {
        let team = Team::new_v1("Pikachu", "NA1", msi("1")).with_player("p1");
        let store = MemoryStore::new().with_team(team.clone());
        store.conflict_on(&team.key());

        let err = store
            .update_roster(&team.key(), RosterUpdate::remove("p1"), "Pikachu")
            .await
            .unwrap_err();
        assert!(err.is_precondition_failed());
        assert_eq!(
            store.operations(),
            vec![StoreOperation::UpdateRoster(team.key())]
        );
    }

    #[tokio::test]
    async fn test_queue_lifecycle() {
        let store = MemoryStore::new();
        let tournament = msi("1");

        let queue = store.add_to_queue("NA1", &tournament, "p1").await.unwrap();
        assert_eq!(queue.players, vec!["p1".to_string()]);

        let queue = store.add_to_queue("NA1", &tournament, "p1").await.unwrap();
        assert_eq!(queue.len(), 1, "Adding twice is idempotent");

        store.add_to_queue("NA1", &tournament, "p2").await.unwrap();
        let queue = store
            .remove_from_queue("NA1", &tournament, "p1")
            .await
            .unwrap();
        assert_eq!(queue.unwrap().players, vec!["p2".to_string()]);

        let queue = store
            .remove_from_queue("NA1", &tournament, "p2")
            .await
            .unwrap();
        assert!(queue.is_none(), "Empty queue is deleted");
        assert!(store.get_queue("NA1", &tournament).await.unwrap().is_none());

        let err = store
            .remove_from_queue("NA1", &tournament, "p2")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_query_queues_by_prefix() {
        let store = MemoryStore::new()
            .with_queue(TentativeQueue::new("NA1", msi("1")).with_player("p1"))
            .with_queue(TentativeQueue::new("NA1", TournamentKey::new("worlds", "1")).with_player("p1"))
            .with_queue(TentativeQueue::new("EUW1", msi("1")).with_player("p1"));

        let queues = store.query_queues("NA1", "ms").await.unwrap();
        assert_eq!(queues.len(), 1);
        assert_eq!(queues[0].tournament, msi("1"));

        let queues = store.query_queues("NA1", "").await.unwrap();
        assert_eq!(queues.len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store
            .list_teams("NA1", VersionFilter::Any)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
