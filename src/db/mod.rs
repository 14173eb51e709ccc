//! Database module for persistent storage.
//!
//! Provides async PostgreSQL access via `sqlx`, grounded in `db/postgresql.go`:
//! a `tg_users` cache (nick lookup for Telegram users, used by `/kick` and
//! history rendering) and a `messages` log written for every relayed line.
//! The module layout — pool wrapper, embedded migrations, one repository
//! struct per concern — follows `slircd-ng`'s `db/mod.rs`.

mod history;

pub use history::HistoryRepository;

use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::Pool;
use std::time::Duration;
use tracing::info;

pub use crate::error::DbError;

/// Database handle with connection pool. `None` when no `dburi` was
/// configured — the bridge still runs, just without history/`hist`/kick
/// support, matching the Go original's "blank dburi disables logging"
/// behavior.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connect to `dburi` and ensure the schema exists, running the embedded
    /// migration unconditionally (it is `CREATE TABLE IF NOT EXISTS`, so
    /// this is safe to run on every start, matching `postgresql.go`'s `Init`).
    pub async fn connect(dburi: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(Some(Self::IDLE_TIMEOUT))
            .connect(dburi)
            .await?;

        sqlx::query(include_str!("../../migrations/001_init.sql"))
            .execute(&pool)
            .await?;

        info!("database connected and schema verified");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn history(&self) -> HistoryRepository<'_> {
        HistoryRepository::new(&self.pool)
    }
}
