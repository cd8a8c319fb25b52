//! Engine configuration management.
//!
//! Consolidates the environment variable reads the engine depends on and
//! validates them once at startup.

use crate::team::{DEFAULT_TEAM_CAPACITY, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What to do with a team record once its last player leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTeamPolicy {
    /// Leave the empty shell; it is offered first to the next player
    Keep,
    /// Delete the record
    Delete,
}

impl fmt::Display for EmptyTeamPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyTeamPolicy::Keep => write!(f, "keep"),
            EmptyTeamPolicy::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for EmptyTeamPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(EmptyTeamPolicy::Keep),
            "delete" => Ok(EmptyTeamPolicy::Delete),
            _ => Err(ConfigError::Invalid {
                var: "EMPTY_TEAM_POLICY".to_string(),
                reason: format!("Expected 'keep' or 'delete', got '{s}'"),
            }),
        }
    }
}

/// Allocation engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seats per team
    pub team_capacity: usize,
    /// Fate of a team whose last player leaves
    pub empty_team_policy: EmptyTeamPolicy,
    /// Upper bound on a single store call
    pub store_query_timeout: Duration,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `TEAM_CAPACITY`: Seats per team (default: 5)
    /// - `EMPTY_TEAM_POLICY`: `keep` or `delete` (default: keep)
    /// - `STORE_QUERY_TIMEOUT_SECS`: Store call timeout (default: 5)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        let empty_team_policy = match std::env::var("EMPTY_TEAM_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => EmptyTeamPolicy::Keep,
        };

        let config = Self {
            team_capacity: parse_env_or("TEAM_CAPACITY", DEFAULT_TEAM_CAPACITY),
            empty_team_policy,
            store_query_timeout: Duration::from_secs(parse_env_or("STORE_QUERY_TIMEOUT_SECS", 5)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.team_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "TEAM_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        // Role-aware teams seat one player per role
        if self.team_capacity > Role::ALL.len() {
            return Err(ConfigError::Invalid {
                var: "TEAM_CAPACITY".to_string(),
                reason: format!("Must be at most {} (one seat per role)", Role::ALL.len()),
            });
        }

        if self.store_query_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "STORE_QUERY_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            team_capacity: DEFAULT_TEAM_CAPACITY,
            empty_team_policy: EmptyTeamPolicy::Keep,
            store_query_timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
