//! Unified error handling for the bridge.
//!
//! One `thiserror` enum per subsystem, following `slircd-ng`'s `error.rs`:
//! in-band errors are logged through `tracing` and bubble up to `main`,
//! which reports them and exits the owning driver task.

pub use crate::config::ConfigError;

use thiserror::Error;

/// Errors from the IRC-side connection and protocol handling.
#[derive(Debug, Error)]
pub enum IrcError {
    #[error("failed to connect to {server}:{port}: {source}")]
    Connect {
        server: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {server} failed: {source}")]
    Tls {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("codec error: {0}")]
    Codec(#[from] std::io::Error),

    #[error("kicked from {channel} by {by}: {reason}")]
    Kicked {
        channel: String,
        by: String,
        reason: String,
    },
}

/// Errors from the Telegram-side long-poll loop and Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telegram API returned an error: {description} (code {error_code})")]
    Api { error_code: i64, description: String },
}

impl From<teloxide::RequestError> for TelegramError {
    fn from(err: teloxide::RequestError) -> Self {
        TelegramError::Api {
            error_code: 0,
            description: err.to_string(),
        }
    }
}

/// Errors from the PostgreSQL-backed history and user store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Errors from uploading media to a pomf/komf host.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload host returned an unexpected response: {0}")]
    BadResponse(String),

    #[error("no upload URL is configured for this storage backend")]
    NotConfigured,
}
