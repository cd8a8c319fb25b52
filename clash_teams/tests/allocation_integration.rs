//! Integration tests for undifferentiated-seat allocation
//!
//! These tests drive the v1 allocator and the tentative manager together
//! against one in-memory store, the way a request handler would.

use clash_teams::store::StoreOperation;
use clash_teams::{
    EmptyTeamPolicy, EngineConfig, MemoryStore, Placement, Team, TeamAllocator, TeamNameGenerator,
    TentativeQueueManager, TournamentKey,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct CountingNames(AtomicUsize);

impl TeamNameGenerator for CountingNames {
    fn generate(&self) -> String {
        format!("Squad {}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn msi(day: &str) -> TournamentKey {
    TournamentKey::new("msi", day)
}

fn setup(config: EngineConfig) -> (MemoryStore, TeamAllocator, TentativeQueueManager) {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = MemoryStore::new();
    let allocator = TeamAllocator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(CountingNames::default()),
        config.clone(),
    );
    let tentative = TentativeQueueManager::new(Arc::new(store.clone()), Arc::new(store.clone()), config);
    (store, allocator, tentative)
}

#[tokio::test]
async fn test_first_player_creates_team_for_first_candidate() {
    let (store, allocator, _) = setup(EngineConfig::default());

    let placement = allocator
        .register_player("P", "NA1", &[msi("1"), msi("2")])
        .await
        .unwrap();

    let team = placement.registered_team().unwrap();
    assert_eq!(team.tournament, msi("1"));
    assert_eq!(team.roster.len(), 1);
    assert!(team.contains("P"));
    assert_eq!(store.teams(), vec![team.clone()]);
}

#[tokio::test]
async fn test_sole_occupant_repeat_request_is_noop() {
    let (store, allocator, _) = setup(EngineConfig::default());

    let first = allocator
        .register_player("P", "NA1", &[msi("1")])
        .await
        .unwrap();
    store.clear_operations();

    let second = allocator
        .register_player("P", "NA1", &[msi("1")])
        .await
        .unwrap();

    assert!(second.already_exists());
    assert_eq!(
        second,
        Placement::Existing(vec![first.registered_team().unwrap().clone()])
    );
    assert!(store.operations().is_empty());
}

#[tokio::test]
async fn test_players_fill_team_before_new_one_is_created() {
    let (store, allocator, _) = setup(EngineConfig::default());

    for player in ["p1", "p2", "p3", "p4", "p5", "p6"] {
        allocator
            .register_player(player, "NA1", &[msi("1")])
            .await
            .unwrap();
    }

    let teams = store.teams();
    assert_eq!(teams.len(), 2);
    let mut sizes: Vec<usize> = teams.iter().map(Team::len).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![1, 5]);
    assert!(teams.iter().all(|team| team.is_consistent(5)));
}

#[tokio::test]
async fn test_player_never_holds_two_seats_in_one_tournament() {
    let (store, allocator, _) = setup(EngineConfig::default());

    allocator.register_player("A", "NA1", &[msi("1")]).await.unwrap();
    allocator.register_player("P", "NA1", &[msi("1")]).await.unwrap();
    // P shares a team with A, so the next request moves P
    allocator.register_player("P", "NA1", &[msi("1")]).await.unwrap();

    let seats = store
        .teams()
        .into_iter()
        .filter(|team| team.tournament == msi("1") && team.contains("P"))
        .count();
    assert_eq!(seats, 1);
}

#[tokio::test]
async fn test_stuck_tournament_is_skipped_for_next_candidate() {
    let (_, allocator, _) = setup(EngineConfig::default());

    allocator.register_player("P", "NA1", &[msi("1")]).await.unwrap();
    let placement = allocator
        .register_player("P", "NA1", &[msi("1"), msi("2")])
        .await
        .unwrap();

    assert_eq!(placement.registered_team().unwrap().tournament, msi("2"));
}

#[tokio::test]
async fn test_servers_are_isolated() {
    let (store, allocator, _) = setup(EngineConfig::default());

    allocator.register_player("A", "NA1", &[msi("1")]).await.unwrap();
    allocator.register_player("B", "EUW1", &[msi("1")]).await.unwrap();

    assert_eq!(store.teams().len(), 2);
    assert!(store.teams().iter().all(|team| team.len() == 1));
}

#[tokio::test]
async fn test_tentative_then_registration_clears_queue() {
    let (store, allocator, tentative) = setup(EngineConfig::default());

    tentative.handle_tentative("P", "NA1", &msi("1")).await.unwrap();
    assert!(store.queue("NA1", &msi("1")).unwrap().contains("P"));

    allocator.register_player("P", "NA1", &[msi("1")]).await.unwrap();
    assert!(store.queue("NA1", &msi("1")).is_none());
}

#[tokio::test]
async fn test_queueing_takes_player_off_team() {
    let (store, allocator, tentative) = setup(EngineConfig {
        empty_team_policy: EmptyTeamPolicy::Delete,
        ..EngineConfig::default()
    });

    allocator.register_player("P", "NA1", &[msi("1")]).await.unwrap();
    tentative.handle_tentative("P", "NA1", &msi("1")).await.unwrap();

    assert!(store.teams().is_empty(), "Emptied team deleted");
    assert!(store.queue("NA1", &msi("1")).unwrap().contains("P"));
}

#[tokio::test]
async fn test_unregister_sweep_stops_at_first_failure() {
    let (store, allocator, _) = setup(EngineConfig::default());

    let first = Team::new_v1("First", "NA1", msi("1")).with_player("P").with_player("A");
    let second = Team::new_v1("Second", "NA1", msi("2")).with_player("P").with_player("B");
    let third = Team::new_v1("Third", "NA1", msi("3")).with_player("P").with_player("C");
    let store = store
        .with_team(first.clone())
        .with_team(second.clone())
        .with_team(third.clone());
    store.conflict_on(&second.key());

    assert!(
        allocator
            .unregister_player("P", "NA1", &[msi("1"), msi("2"), msi("3")])
            .await
            .is_err()
    );

    assert!(!store.team(&first.key()).unwrap().contains("P"));
    assert!(store.team(&second.key()).unwrap().contains("P"));
    assert!(store.team(&third.key()).unwrap().contains("P"), "Not attempted");
    assert!(
        !store
            .operations()
            .contains(&StoreOperation::UpdateRoster(third.key()))
    );
}

#[tokio::test]
async fn test_unavailable_store_is_propagated() {
    let (store, allocator, _) = setup(EngineConfig::default());
    store.set_unavailable(true);

    let err = allocator
        .register_player("P", "NA1", &[msi("1")])
        .await
        .unwrap_err();
    assert_eq!(err.client_message(), "Service temporarily unavailable");
}
