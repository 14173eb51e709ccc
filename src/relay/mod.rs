//! The message bus connecting the IRC and Telegram drivers.
//!
//! Grounded directly in `relay.go`: a [`Relay`] owns four bounded
//! `tokio::sync::mpsc` channels with the same capacities as the original's
//! buffered Go channels — 100 slots for chat traffic, 20 for service
//! commands. Each channel gives FIFO delivery on its own; there is no
//! ordering guarantee *across* channels, matching the original's plain
//! `chan Message`/`chan ServiceMessage` pairs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

const CHAT_CHANNEL_CAPACITY: usize = 100;
const SERVICE_CHANNEL_CAPACITY: usize = 20;

/// A chat message relayed between IRC and Telegram.
#[derive(Debug, Clone)]
pub struct Message {
    pub date: DateTime<Utc>,
    /// `true` if this message originated in Telegram, `false` for IRC.
    pub source: bool,
    pub nick: String,
    pub text: String,

    /// Telegram message id, unused for IRC-originated messages.
    pub id: Option<i64>,
    /// Telegram sender user id, unused for IRC-originated messages.
    pub from_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Side-channel metadata: CTCP ACTION/kick/topic markers on the IRC
    /// side, media/reply/forward/pin/edit/membership markers on the
    /// Telegram side. Never relayed verbatim, only consulted by the
    /// receiving driver.
    pub extra: HashMap<String, String>,
}

impl Message {
    pub fn new(source: bool, nick: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            date: Utc::now(),
            source,
            nick: nick.into(),
            text: text.into(),
            id: None,
            from_id: None,
            first_name: None,
            last_name: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// The sender's display name: the nick if set, otherwise the
    /// Telegram first/last name joined with a space.
    pub fn name(&self) -> String {
        if self.nick.is_empty() {
            match (&self.first_name, &self.last_name) {
                (Some(first), Some(last)) if !last.is_empty() => format!("{first} {last}"),
                (Some(first), _) => first.clone(),
                _ => String::new(),
            }
        } else {
            self.nick.clone()
        }
    }
}

/// A service command, never relayed as chat: rehash, kick, ban, shutdown,
/// and the soft poison-pill used to drain a driver during shutdown.
#[derive(Debug, Clone)]
pub struct ServiceMessage {
    pub command: String,
    pub arguments: Vec<String>,
}

impl ServiceMessage {
    pub fn new(command: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    /// The soft-cancellation poison pill: tells a driver's service loop to
    /// stop accepting new work but keep draining what's already queued.
    pub fn break_signal() -> Self {
        Self::new("break", Vec::new())
    }

    pub fn is_break(&self) -> bool {
        self.command == "break"
    }
}

/// Senders for posting into the relay, handed to the driver that produces
/// on that side.
#[derive(Clone)]
pub struct RelaySenders {
    pub tele_tx: mpsc::Sender<Message>,
    pub tele_service_tx: mpsc::Sender<ServiceMessage>,
    pub irc_tx: mpsc::Sender<Message>,
    pub irc_service_tx: mpsc::Sender<ServiceMessage>,
}

/// Receivers for consuming from the relay, handed to the driver that
/// delivers on that side (IRC consumes `TeleCh`/`TeleServiceCh`, Telegram
/// consumes `IRCh`/`IRCServiceCh`).
pub struct RelayReceivers {
    pub tele_rx: mpsc::Receiver<Message>,
    pub tele_service_rx: mpsc::Receiver<ServiceMessage>,
    pub irc_rx: mpsc::Receiver<Message>,
    pub irc_service_rx: mpsc::Receiver<ServiceMessage>,
}

/// Builds a fresh relay: four bounded channels plus the split sender/receiver
/// halves handed out to the two drivers.
pub fn new_relay() -> (RelaySenders, RelayReceivers) {
    let (tele_tx, tele_rx) = mpsc::channel(CHAT_CHANNEL_CAPACITY);
    let (irc_tx, irc_rx) = mpsc::channel(CHAT_CHANNEL_CAPACITY);
    let (tele_service_tx, tele_service_rx) = mpsc::channel(SERVICE_CHANNEL_CAPACITY);
    let (irc_service_tx, irc_service_rx) = mpsc::channel(SERVICE_CHANNEL_CAPACITY);

    (
        RelaySenders {
            tele_tx,
            tele_service_tx,
            irc_tx,
            irc_service_tx,
        },
        RelayReceivers {
            tele_rx,
            tele_service_rx,
            irc_rx,
            irc_service_rx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_prefers_nick() {
        let mut msg = Message::new(true, "alice", "hi");
        msg.first_name = Some("Not".into());
        assert_eq!(msg.name(), "alice");
    }

    #[test]
    fn name_falls_back_to_telegram_names() {
        let mut msg = Message::new(true, "", "hi");
        msg.first_name = Some("Ada".into());
        msg.last_name = Some("Lovelace".into());
        assert_eq!(msg.name(), "Ada Lovelace");
    }

    #[test]
    fn name_falls_back_to_first_name_only() {
        let mut msg = Message::new(true, "", "hi");
        msg.first_name = Some("Ada".into());
        assert_eq!(msg.name(), "Ada");
    }

    #[tokio::test]
    async fn channels_have_expected_capacity() {
        let (senders, mut receivers) = new_relay();
        for _ in 0..CHAT_CHANNEL_CAPACITY {
            senders
                .irc_tx
                .try_send(Message::new(false, "x", "y"))
                .expect("should fit within capacity");
        }
        assert!(senders.irc_tx.try_send(Message::new(false, "x", "y")).is_err());
        receivers.irc_rx.recv().await.unwrap();
        assert!(senders.irc_tx.try_send(Message::new(false, "x", "y")).is_ok());
    }

    #[test]
    fn break_signal_is_recognized() {
        assert!(ServiceMessage::break_signal().is_break());
        assert!(!ServiceMessage::new("kick", vec![]).is_break());
    }
}
