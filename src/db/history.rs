//! Message logging and the `tg_users` lookup cache.
//!
//! Grounded in `db/postgresql.go`'s `Log`/`Init` and the `FindUser` query
//! given in the external interfaces contract.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use sqlx::postgres::Postgres;
use sqlx::Pool;

use crate::error::DbError;
use crate::relay::Message;

pub struct HistoryRepository<'a> {
    pool: &'a Pool<Postgres>,
}

/// A Telegram user resolved by nick or display-name prefix, used when an
/// IRC operator types `irchuu kick <name>` and the bridge needs a Telegram
/// user id to moderate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundUser {
    pub id: i64,
    pub display_name: String,
}

/// One row pulled back for the `hist` command.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub nick: String,
    pub text: String,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(pool: &'a Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Log a relayed message. IRC-origin messages carry no Telegram id;
    /// Telegram-origin messages additionally upsert the `tg_users` cache.
    /// Messages containing non-UTF-8 text never reach this call — the
    /// driver validates and drops those before logging, per the error
    /// handling contract.
    pub async fn log(&self, msg: &Message) -> Result<(), DbError> {
        let extra: Json = serde_json::to_value(&msg.extra).unwrap_or(Json::Null);

        sqlx::query(
            r#"INSERT INTO messages (date, source, nick, "text", from_id, msg_id, extra)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(msg.date)
        .bind(msg.source)
        .bind(&msg.nick)
        .bind(&msg.text)
        .bind(msg.from_id)
        .bind(msg.id)
        .bind(extra)
        .execute(self.pool)
        .await?;

        if msg.source {
            if let Some(from_id) = msg.from_id {
                self.upsert_tg_user(
                    from_id,
                    &msg.nick,
                    msg.first_name.as_deref(),
                    msg.last_name.as_deref(),
                )
                .await?;
            }
        }

        Ok(())
    }

    /// Upsert a Telegram user's last-seen identity. An empty nick is stored
    /// as `NULL` so `coalesce(nick, first_name||' '||last_name)` in
    /// `find_user` falls through to the display name.
    pub async fn upsert_tg_user(
        &self,
        id: i64,
        nick: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<(), DbError> {
        let nick = (!nick.is_empty()).then_some(nick);

        sqlx::query(
            r#"INSERT INTO tg_users (id, nick, first_name, last_name, last_active)
               VALUES ($1, $2, $3, $4, now())
               ON CONFLICT (id) DO UPDATE SET
                   nick = EXCLUDED.nick,
                   first_name = EXCLUDED.first_name,
                   last_name = EXCLUDED.last_name,
                   last_active = EXCLUDED.last_active"#,
        )
        .bind(id)
        .bind(nick)
        .bind(first_name)
        .bind(last_name)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Resolve a nick or display-name prefix to the most recently active
    /// matching Telegram user.
    pub async fn find_user(&self, query: &str) -> Result<Option<FoundUser>, DbError> {
        let row: Option<(i64, Option<String>)> = sqlx::query_as(
            r#"SELECT id, coalesce(nick, first_name || ' ' || last_name)
               FROM tg_users
               WHERE nick LIKE $1 || '%' OR first_name || ' ' || last_name LIKE $1 || '%'
               ORDER BY last_active DESC
               LIMIT 1"#,
        )
        .bind(query)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, display_name)| FoundUser {
            id,
            display_name: display_name.unwrap_or_default(),
        }))
    }

    /// Fetch the last `limit` relayed messages (both IRC and Telegram
    /// origin), oldest first, for the `hist` command.
    pub async fn recent(&self, limit: u32) -> Result<Vec<HistoryEntry>, DbError> {
        let rows: Vec<(DateTime<Utc>, Option<String>, Option<String>)> = sqlx::query_as(
            r#"SELECT date, nick, "text" FROM messages ORDER BY date DESC LIMIT $1"#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .rev()
            .map(|(date, nick, text)| HistoryEntry {
                date,
                nick: nick.unwrap_or_default(),
                text: text.unwrap_or_default(),
            })
            .collect())
    }
}
