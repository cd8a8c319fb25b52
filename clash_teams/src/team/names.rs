//! Display names for newly created teams.

use super::models::Team;
use crate::store::{StoreError, StoreResult, TeamStore};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Names tried before a key collision is reported to the caller
pub(crate) const NAME_ATTEMPTS: usize = 3;

const ADJECTIVES: &[&str] = &[
    "Abyssal", "Arcane", "Blazing", "Crimson", "Elder", "Frozen", "Gilded", "Hextech", "Infernal",
    "Iron", "Lunar", "Mountain", "Ocean", "Radiant", "Shadow", "Silent", "Solar", "Storm",
    "Void", "Wild",
];

const NOUNS: &[&str] = &[
    "Baron", "Blade", "Brambles", "Dragons", "Drakes", "Golems", "Guardians", "Heralds", "Krugs",
    "Minions", "Nexus", "Poros", "Raptors", "Scuttlers", "Sentinels", "Turrets", "Wardens",
    "Wards", "Wolves", "Wraiths",
];

/// Supplies human-readable names for new teams.
///
/// Names are not deduplicated here. A clash surfaces as `AlreadyExists` from
/// the store and the allocators draw a fresh name.
pub trait TeamNameGenerator: Send + Sync {
    /// Produce a name for a new team
    fn generate(&self) -> String;
}

/// Picks a random adjective, noun and tag, e.g. `Lunar Baron 4821`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTeamNames;

impl RandomTeamNames {
    /// Create a new random name generator
    pub fn new() -> Self {
        Self
    }
}

impl TeamNameGenerator for RandomTeamNames {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Team");
        let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Five");
        let tag: u16 = rng.random_range(1000..10000);
        format!("{adjective} {noun} {tag}")
    }
}

/// Create the team built by `build` under a generated name, drawing a new
/// name when the key is already taken.
pub(crate) async fn create_named_team<F>(
    store: &dyn TeamStore,
    names: &dyn TeamNameGenerator,
    build: F,
) -> StoreResult<Team>
where
    F: Fn(String) -> Team,
{
    let mut attempt = 1;
    loop {
        let team = build(names.generate());
        match store.create_team(&team).await {
            Err(StoreError::AlreadyExists(key)) if attempt < NAME_ATTEMPTS => {
                log::debug!("Team name taken: {}, drawing another", key);
                attempt += 1;
            }
            result => return result,
        }
    }
}
