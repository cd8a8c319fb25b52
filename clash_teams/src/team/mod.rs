//! Team module: team records and the two seat allocators.
//!
//! This module implements:
//! - Team records with a flat roster (v1) or a roster plus role map (v2)
//! - Per-tournament partitioning of a server's teams
//! - [`TeamAllocator`] for undifferentiated seats
//! - [`RoleAllocator`] for role-aware seats
//!
//! Both allocators scan once, decide from the scanned data, and then issue
//! conditional writes. A move places the player first and releases the old
//! seat afterwards.
//!
//! ## Example
//!
//! ```no_run
//! use clash_teams::config::EngineConfig;
//! use clash_teams::store::MemoryStore;
//! use clash_teams::team::{RandomTeamNames, TeamAllocator};
//! use clash_teams::tournament::TournamentKey;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let allocator = TeamAllocator::new(
//!         Arc::new(store.clone()),
//!         Arc::new(store),
//!         Arc::new(RandomTeamNames::new()),
//!         EngineConfig::default(),
//!     );
//!
//!     let placement = allocator
//!         .register_player("player-1", "NA1", &[TournamentKey::new("msi", "1")])
//!         .await?;
//!     println!("{:?}", placement.registered_team());
//!
//!     Ok(())
//! }
//! ```

pub mod allocator;
pub mod errors;
pub mod models;
pub mod names;
pub mod partition;
pub mod role_allocator;
pub(crate) mod seats;

pub use allocator::{Placement, TeamAllocator};
pub use errors::{TeamError, TeamResult};
pub use models::{
    DEFAULT_TEAM_CAPACITY, ParseRoleError, PlayerId, Role, RoleMap, Team, TeamKey, TeamVersion,
};
pub use names::{RandomTeamNames, TeamNameGenerator};
pub use partition::{AllocationPlan, PlanTarget, TeamPartition, TournamentSlot};
pub use role_allocator::{RoleAllocator, RoleRegistration};
