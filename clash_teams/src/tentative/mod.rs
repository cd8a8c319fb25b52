//! Tentative module: per-server, per-tournament waiting lists.
//!
//! A player is on a team, on the tentative queue, or neither, for any one
//! tournament. Queueing releases the player's seat for that tournament and
//! team registration takes them off the queue.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TentativeError, TentativeResult};
pub use manager::TentativeQueueManager;
pub use models::{Association, TentativeOutcome, TentativeQueue};
