//! PostgreSQL implementations of the store traits.
//!
//! Expects the deployment to provide two tables:
//!
//! ```sql
//! CREATE TABLE teams (
//!     team_key        TEXT PRIMARY KEY,
//!     team_name       TEXT NOT NULL,
//!     server          TEXT NOT NULL,
//!     tournament_name TEXT NOT NULL,
//!     tournament_day  TEXT NOT NULL,
//!     players         TEXT[] NOT NULL DEFAULT '{}',
//!     role_map        JSONB,
//!     version         INT
//! );
//!
//! CREATE TABLE tentative_queues (
//!     server          TEXT NOT NULL,
//!     tournament_name TEXT NOT NULL,
//!     tournament_day  TEXT NOT NULL,
//!     players         TEXT[] NOT NULL,
//!     PRIMARY KEY (server, tournament_name, tournament_day)
//! );
//! ```
//!
//! Roster changes are single `UPDATE ... WHERE team_key = $1 AND team_name = $2`
//! statements; an update matching no row is a failed precondition.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    RoleChange, RosterDelta, RosterUpdate, StoreError, StoreResult, TeamStore, TentativeStore,
    VersionFilter,
};
use crate::config::EngineConfig;
use crate::db::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::team::{RoleMap, Team, TeamKey, TeamVersion};
use crate::tentative::TentativeQueue;
use crate::tournament::TournamentKey;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;

const TEAM_COLUMNS: &str =
    "team_key, team_name, server, tournament_name, tournament_day, players, role_map, version";

const QUEUE_COLUMNS: &str = "server, tournament_name, tournament_day, players";

// A concurrent join or rename between the release and this delete wins
const DELETE_EMPTY_TEAM_SQL: &str = "DELETE FROM teams
     WHERE team_key = $1 AND team_name = $2 AND cardinality(players) = 0";

/// Team records in PostgreSQL
#[derive(Clone)]
pub struct PgTeamStore {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgTeamStore {
    /// Create a team store with the default query timeout
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_query_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a team store with an explicit query timeout
    pub fn with_query_timeout(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create a team store using the engine's configured query timeout
    pub fn from_config(pool: Arc<PgPool>, config: &EngineConfig) -> Self {
        Self::with_query_timeout(pool, config.store_query_timeout)
    }
}

fn team_from_row(row: &PgRow) -> StoreResult<Team> {
    let key: String = row.try_get("team_key")?;
    let marker: Option<i32> = row.try_get("version")?;
    let version = TeamVersion::from_marker(marker).ok_or_else(|| StoreError::CorruptRecord {
        key: key.clone(),
        reason: format!("unknown version marker {marker:?}"),
    })?;

    let role_map = row
        .try_get::<Option<serde_json::Value>, _>("role_map")?
        .map(serde_json::from_value::<RoleMap>)
        .transpose()?;
    let players: Vec<String> = row.try_get("players")?;

    Ok(Team {
        name: row.try_get("team_name")?,
        server: row.try_get("server")?,
        tournament: TournamentKey::new(
            row.try_get::<String, _>("tournament_name")?,
            row.try_get::<String, _>("tournament_day")?,
        ),
        roster: players.into_iter().collect(),
        role_map,
        version,
    })
}

/// Build the conditional update for a roster change.
///
/// Parameters: `$1` key, `$2` expected team name, `$3` player,
/// `$4` capacity (nullable), `$5` claimed role label (nullable).
fn roster_update_sql(update: &RosterUpdate) -> String {
    let players = match update.delta {
        RosterDelta::Add(_) => {
            "CASE WHEN $3 = ANY(players) THEN players ELSE array_append(players, $3) END"
        }
        RosterDelta::Remove(_) => "array_remove(players, $3)",
    };

    // Roles held by the player, as a key array for `jsonb - text[]`
    let held = "COALESCE((SELECT array_agg(e.key) FROM jsonb_each_text(COALESCE(role_map, '{}'::jsonb)) AS e WHERE e.value = $3), '{}'::text[])";
    let roles = match update.role_change {
        Some(RoleChange::Assign(_)) => format!(
            ", role_map = (COALESCE(role_map, '{{}}'::jsonb) - {held}) || jsonb_build_object($5::text, $3::text)"
        ),
        Some(RoleChange::Release) => format!(", role_map = role_map - {held}"),
        None => String::new(),
    };

    format!(
        r#"
        UPDATE teams
        SET players = {players}{roles}
        WHERE team_key = $1
          AND team_name = $2
          AND ($4::INT IS NULL OR $3 = ANY(players) OR cardinality(players) < $4)
          AND ($5::TEXT IS NULL OR role_map IS NULL OR NOT (role_map ? $5) OR role_map ->> $5 = $3)
        RETURNING {TEAM_COLUMNS}
        "#
    )
}

#[async_trait]
impl TeamStore for PgTeamStore {
    async fn list_teams(&self, server: &str, filter: VersionFilter) -> StoreResult<Vec<Team>> {
        let rows = match filter {
            VersionFilter::Unversioned => {
                let sql =
                    format!("SELECT {TEAM_COLUMNS} FROM teams WHERE server = $1 AND version IS NULL");
                with_timeout(
                    self.timeout,
                    sqlx::query(&sql).bind(server).fetch_all(self.pool.as_ref()),
                )
                .await?
            }
            VersionFilter::Version(version) => {
                let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE server = $1 AND version = $2");
                with_timeout(
                    self.timeout,
                    sqlx::query(&sql)
                        .bind(server)
                        .bind(version)
                        .fetch_all(self.pool.as_ref()),
                )
                .await?
            }
            VersionFilter::Any => {
                let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE server = $1");
                with_timeout(
                    self.timeout,
                    sqlx::query(&sql).bind(server).fetch_all(self.pool.as_ref()),
                )
                .await?
            }
        };

        rows.iter().map(team_from_row).collect()
    }

    async fn get_team(&self, key: &TeamKey) -> StoreResult<Option<Team>> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE team_key = $1");
        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(key.as_str())
                .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.as_ref().map(team_from_row).transpose()
    }

    async fn create_team(&self, team: &Team) -> StoreResult<Team> {
        let key = team.key();
        let players: Vec<String> = team.roster.iter().cloned().collect();
        let role_map = team
            .role_map
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let sql = format!(
            r#"
            INSERT INTO teams ({TEAM_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (team_key) DO NOTHING
            RETURNING {TEAM_COLUMNS}
            "#
        );

        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(key.as_str())
                .bind(&team.name)
                .bind(&team.server)
                .bind(&team.tournament.name)
                .bind(&team.tournament.day)
                .bind(players)
                .bind(role_map)
                .bind(team.version.marker())
                .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or_else(|| StoreError::AlreadyExists(key.to_string()))?;

        team_from_row(&row)
    }

    async fn update_roster(
        &self,
        key: &TeamKey,
        update: RosterUpdate,
        expected_team_name: &str,
    ) -> StoreResult<Team> {
        let sql = roster_update_sql(&update);
        let capacity = update
            .capacity
            .map(|capacity| i32::try_from(capacity).unwrap_or(i32::MAX));
        let role = match update.role_change {
            Some(RoleChange::Assign(role)) => Some(role.label()),
            _ => None,
        };

        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(key.as_str())
                .bind(expected_team_name)
                .bind(update.player_id())
                .bind(capacity)
                .bind(role)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or_else(|| StoreError::PreconditionFailed(key.to_string()))?;

        team_from_row(&row)
    }

    async fn delete_team(&self, key: &TeamKey, expected_team_name: &str) -> StoreResult<bool> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(DELETE_EMPTY_TEAM_SQL)
                .bind(key.as_str())
                .bind(expected_team_name)
                .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Tentative queue records in PostgreSQL
#[derive(Clone)]
pub struct PgTentativeStore {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgTentativeStore {
    /// Create a queue store with the default query timeout
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_query_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a queue store with an explicit query timeout
    pub fn with_query_timeout(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create a queue store using the engine's configured query timeout
    pub fn from_config(pool: Arc<PgPool>, config: &EngineConfig) -> Self {
        Self::with_query_timeout(pool, config.store_query_timeout)
    }
}

fn queue_from_row(row: &PgRow) -> StoreResult<TentativeQueue> {
    Ok(TentativeQueue {
        server: row.try_get("server")?,
        tournament: TournamentKey::new(
            row.try_get::<String, _>("tournament_name")?,
            row.try_get::<String, _>("tournament_day")?,
        ),
        players: row.try_get("players")?,
    })
}

#[async_trait]
impl TentativeStore for PgTentativeStore {
    async fn get_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
    ) -> StoreResult<Option<TentativeQueue>> {
        let sql = format!(
            "SELECT {QUEUE_COLUMNS} FROM tentative_queues
             WHERE server = $1 AND tournament_name = $2 AND tournament_day = $3"
        );
        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(server)
                .bind(&tournament.name)
                .bind(&tournament.day)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        row.as_ref().map(queue_from_row).transpose()
    }

    async fn query_queues(
        &self,
        server: &str,
        name_prefix: &str,
    ) -> StoreResult<Vec<TentativeQueue>> {
        let sql = format!(
            "SELECT {QUEUE_COLUMNS} FROM tentative_queues
             WHERE server = $1 AND starts_with(tournament_name, $2)
             ORDER BY tournament_name, tournament_day"
        );
        let rows = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(server)
                .bind(name_prefix)
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter().map(queue_from_row).collect()
    }

    async fn add_to_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<TentativeQueue> {
        let sql = format!(
            r#"
            INSERT INTO tentative_queues ({QUEUE_COLUMNS})
            VALUES ($1, $2, $3, ARRAY[$4::TEXT])
            ON CONFLICT (server, tournament_name, tournament_day)
            DO UPDATE SET players = CASE
                WHEN $4 = ANY(tentative_queues.players) THEN tentative_queues.players
                ELSE array_append(tentative_queues.players, $4)
            END
            RETURNING {QUEUE_COLUMNS}
            "#
        );
        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(server)
                .bind(&tournament.name)
                .bind(&tournament.day)
                .bind(player_id)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        queue_from_row(&row)
    }

    async fn remove_from_queue(
        &self,
        server: &str,
        tournament: &TournamentKey,
        player_id: &str,
    ) -> StoreResult<Option<TentativeQueue>> {
        let sql = format!(
            r#"
            UPDATE tentative_queues
            SET players = array_remove(players, $4)
            WHERE server = $1 AND tournament_name = $2 AND tournament_day = $3
            RETURNING {QUEUE_COLUMNS}
            "#
        );
        let row = with_timeout(
            self.timeout,
            sqlx::query(&sql)
                .bind(server)
                .bind(&tournament.name)
                .bind(&tournament.day)
                .bind(player_id)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("{server}#{tournament}")))?;

        let queue = queue_from_row(&row)?;
        if !queue.is_empty() {
            return Ok(Some(queue));
        }

        // Only delete if nobody joined in between
        with_timeout(
            self.timeout,
            sqlx::query(
                "DELETE FROM tentative_queues
                 WHERE server = $1 AND tournament_name = $2 AND tournament_day = $3
                   AND cardinality(players) = 0",
            )
            .bind(server)
            .bind(&tournament.name)
            .bind(&tournament.day)
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(None)
    }
}
