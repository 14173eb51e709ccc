//! irchuu - a bidirectional IRC<->Telegram relay bridge.
//!
//! Split into a library and a thin [`main`](../bin/irchuu) binary so the
//! driver internals (classification, markup translation, colorizing,
//! rendering) are reachable from integration tests without a live IRC
//! server or Telegram API.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod irc;
pub mod relay;
pub mod telegram;
pub mod telemetry;
pub mod upload;
