//! Integration tests for role-aware allocation
//!
//! v1 and v2 records share the store; these tests check the two allocators
//! never touch each other's teams and that role maps stay consistent.

use clash_teams::{
    EngineConfig, MemoryStore, Role, RoleAllocator, TeamAllocator, TeamError, TeamNameGenerator,
    TeamVersion, TournamentKey,
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

fn setup() -> (MemoryStore, TeamAllocator, RoleAllocator) {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = MemoryStore::new();
    let names: Arc<dyn TeamNameGenerator> = Arc::new(CountingNames::default());
    let v1 = TeamAllocator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        names.clone(),
        EngineConfig::default(),
    );
    let v2 = RoleAllocator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        names,
        EngineConfig::default(),
    );
    (store, v1, v2)
}

#[tokio::test]
async fn test_five_roles_fill_one_team() {
    let (store, _, allocator) = setup();

    for (player, role) in ["p1", "p2", "p3", "p4", "p5"].into_iter().zip(Role::ALL) {
        allocator
            .register_player_to_new_team_v2(player, role, "NA1", &[msi("1")])
            .await
            .unwrap();
    }

    let teams = store.teams();
    assert_eq!(teams.len(), 1);
    let team = &teams[0];
    assert_eq!(team.len(), 5);
    assert!(team.is_consistent(5));
    assert!(Role::ALL.iter().all(|role| !team.has_open_role(*role)));
}

#[tokio::test]
async fn test_duplicate_role_requests_spread_across_teams() {
    let (store, _, allocator) = setup();

    for player in ["p1", "p2", "p3"] {
        allocator
            .register_player_to_new_team_v2(player, Role::Mid, "NA1", &[msi("1")])
            .await
            .unwrap();
    }

    let teams = store.teams();
    assert_eq!(teams.len(), 3);
    assert!(teams.iter().all(|team| team.role_holder(Role::Mid).is_some()));
}

#[tokio::test]
async fn test_named_team_with_taken_role_is_rejected_before_writing() {
    let (store, _, allocator) = setup();

    let registration = allocator
        .register_player_to_new_team_v2("A", Role::Top, "NA1", &[msi("1")])
        .await
        .unwrap();
    let team_name = registration.registered_team.unwrap().name;
    store.clear_operations();

    let err = allocator
        .register_with_specific_team_v2("P", Role::Top, "NA1", &[msi("1")], &team_name)
        .await
        .unwrap_err();

    assert!(matches!(err, TeamError::RoleTaken { role: Role::Top, .. }));
    assert!(store.operations().is_empty());
}

#[tokio::test]
async fn test_v1_and_v2_teams_coexist() {
    let (store, v1, v2) = setup();

    v1.register_player("A", "NA1", &[msi("1")]).await.unwrap();
    v2.register_player_to_new_team_v2("B", Role::Top, "NA1", &[msi("1")])
        .await
        .unwrap();
    v1.register_player("C", "NA1", &[msi("1")]).await.unwrap();
    v2.register_player_to_new_team_v2("D", Role::Jg, "NA1", &[msi("1")])
        .await
        .unwrap();

    let teams = store.teams();
    assert_eq!(teams.len(), 2);
    let legacy = teams.iter().find(|t| t.version == TeamVersion::V1).unwrap();
    let role_aware = teams.iter().find(|t| t.version == TeamVersion::V2).unwrap();

    assert!(legacy.contains("A") && legacy.contains("C"));
    assert!(legacy.role_map.is_none());
    assert_eq!(role_aware.role_of("B"), Some(Role::Top));
    assert_eq!(role_aware.role_of("D"), Some(Role::Jg));
}

#[tokio::test]
async fn test_switching_teams_moves_role() {
    let (store, _, allocator) = setup();

    let first = allocator
        .register_player_to_new_team_v2("A", Role::Top, "NA1", &[msi("1")])
        .await
        .unwrap()
        .registered_team
        .unwrap();
    allocator
        .register_player_to_new_team_v2("P", Role::Mid, "NA1", &[msi("1")])
        .await
        .unwrap();
    let second = allocator
        .register_player_to_new_team_v2("B", Role::Mid, "NA1", &[msi("1")])
        .await
        .unwrap()
        .registered_team
        .unwrap();
    assert_ne!(first.key(), second.key());

    let registration = allocator
        .register_with_specific_team_v2("P", Role::Supp, "NA1", &[msi("1")], &second.name)
        .await
        .unwrap();

    assert_eq!(registration.unregistered_teams.len(), 1);
    let first_now = store.team(&first.key()).unwrap();
    let second_now = store.team(&second.key()).unwrap();
    assert!(!first_now.contains("P"));
    assert!(first_now.has_open_role(Role::Mid));
    assert_eq!(second_now.role_of("P"), Some(Role::Supp));
    assert!(first_now.is_consistent(5) && second_now.is_consistent(5));
}

#[tokio::test]
async fn test_unregister_v2_leaves_v1_seats() {
    let (store, v1, v2) = setup();

    v1.register_player("P", "NA1", &[msi("1")]).await.unwrap();
    v2.register_player_to_new_team_v2("P", Role::Bot, "NA1", &[msi("1")])
        .await
        .unwrap();

    let released = v2.unregister_player_v2("P", "NA1", &[msi("1")]).await.unwrap();

    assert_eq!(released.len(), 1);
    assert_eq!(released[0].version, TeamVersion::V2);
    assert!(released[0].has_open_role(Role::Bot));
    assert!(
        store
            .teams()
            .iter()
            .any(|team| team.version == TeamVersion::V1 && team.contains("P"))
    );
}
