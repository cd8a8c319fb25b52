//! Tournament module: tournament records and the directory of valid ones.
//!
//! A tournament is identified by its name and day. The engine binds teams and
//! tentative queues to a [`TournamentKey`]; the [`TournamentDirectory`] is what
//! request handlers use to turn a user's name/day filter into the ordered list
//! of candidate tournaments for allocation.
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use clash_teams::tournament::{Tournament, TournamentCalendar};
//!
//! let now = Utc::now();
//! let calendar = TournamentCalendar::default().with_tournament(Tournament::new(
//!     "msi",
//!     "1",
//!     now + Duration::days(1),
//!     now - Duration::days(3),
//! ));
//!
//! let candidates: Vec<_> = calendar
//!     .valid_at(now, Some("msi"), None)
//!     .iter()
//!     .map(Tournament::key)
//!     .collect();
//! assert_eq!(candidates[0].partition_key(), "msi#1");
//! ```

pub mod directory;
pub mod models;

pub use directory::{TournamentCalendar, TournamentDirectory};
pub use models::{Tournament, TournamentKey};
