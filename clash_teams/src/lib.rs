//! # Clash Teams
//!
//! Team assignment and tentative queue engine for multi-day tournament
//! events played in five-player teams.
//!
//! For a player asking to join one of several candidate tournament days, the
//! engine decides which team they end up on (an existing open team or a new
//! one), fills role slots, moves players between teams, and keeps a waiting
//! list of players who have no team yet.
//!
//! The backing store only offers per-record conditional writes. Every roster
//! change is therefore conditioned on the team name read beforehand, and a
//! move is two writes: place first, then release.
//!
//! ## Core Modules
//!
//! - [`store`]: Store traits, in-memory and PostgreSQL implementations
//! - [`team`]: Team records and the v1 / v2 allocators
//! - [`tentative`]: Tentative waiting queues
//! - [`tournament`]: Tournament records and the directory of valid ones
//! - [`config`]: Engine configuration
//! - [`db`]: PostgreSQL pool, store wiring and call timeouts
//!
//! ## Example
//!
//! ```
//! use clash_teams::{EngineConfig, MemoryStore, RandomTeamNames, TeamAllocator, TournamentKey};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MemoryStore::new();
//! let allocator = TeamAllocator::new(
//!     Arc::new(store.clone()),
//!     Arc::new(store.clone()),
//!     Arc::new(RandomTeamNames::new()),
//!     EngineConfig::default(),
//! );
//!
//! let placement = allocator
//!     .register_player("player-1", "NA1", &[TournamentKey::new("msi", "1")])
//!     .await
//!     .unwrap();
//! assert!(placement.registered_team().unwrap().contains("player-1"));
//! # });
//! ```

/// Engine configuration.
pub mod config;
pub use config::{ConfigError, EmptyTeamPolicy, EngineConfig};

/// PostgreSQL connection pool and timeouts.
pub mod db;

/// Store access layer.
pub mod store;
pub use store::{
    MemoryStore, PgTeamStore, PgTentativeStore, RosterUpdate, StoreError, StoreResult,
    TeamStore, TentativeStore, VersionFilter,
};

/// Team records and allocation.
pub mod team;
pub use team::{
    Placement, RandomTeamNames, Role, RoleAllocator, RoleRegistration, Team, TeamAllocator,
    TeamError, TeamKey, TeamNameGenerator, TeamResult, TeamVersion,
};

/// Tentative waiting queues.
pub mod tentative;
pub use tentative::{
    Association, TentativeError, TentativeOutcome, TentativeQueue, TentativeQueueManager,
    TentativeResult,
};

/// Tournament records.
pub mod tournament;
pub use tournament::{Tournament, TournamentCalendar, TournamentDirectory, TournamentKey};
