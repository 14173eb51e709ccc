//! The Telegram side of the bridge: long-poll update loop, message
//! classification, command dispatch, media storage and the paced outbound
//! render, mirroring the shape of the `irc` module for the opposite side.
//!
//! The driver owns the `teloxide::Bot` handle and the data directory used
//! for media; everything else only ever sees it through the relay's
//! bounded channels.

pub mod classify;
pub mod commands;
pub mod markup;
pub mod media;
pub mod service;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, ParseMode, Update, UpdateKind};
use teloxide::Bot;
use tokio::sync::mpsc;

use crate::config::TelegramConfig;
use crate::db::Database;
use crate::error::TelegramError;
use crate::relay::{self, ServiceMessage};

use classify::OwnIdentity;

pub struct TelegramDriver {
    config: TelegramConfig,
    history: Option<Arc<Database>>,
    data_dir: PathBuf,
}

impl TelegramDriver {
    pub fn new(config: TelegramConfig, history: Option<Arc<Database>>, data_dir: PathBuf) -> Self {
        Self { config, history, data_dir }
    }

    /// Run the driver to completion. Returns `Ok(())` only if the long-poll
    /// loop is cancelled cleanly from outside; any Telegram API failure is
    /// returned as an error for `main` to log.
    pub async fn run(
        self,
        irc_rx: mpsc::Receiver<relay::Message>,
        irc_service_rx: mpsc::Receiver<ServiceMessage>,
        tele_tx: mpsc::Sender<relay::Message>,
        tele_service_tx: mpsc::Sender<ServiceMessage>,
    ) -> Result<(), TelegramError> {
        let bot = Bot::new(self.config.token.clone());
        let me = bot.get_me().await?;
        tracing::info!(target: "telegram", username = ?me.user.username, "authorized on telegram account");

        let own = OwnIdentity { user_id: me.user.id.0, prefix: self.config.prefix.clone() };
        let client = reqwest::Client::new();

        let outbound = tokio::spawn(outbound_pump(bot.clone(), irc_rx, self.config.clone()));
        let service = tokio::spawn(service::run(bot.clone(), irc_service_rx, self.config.clone(), tele_service_tx.clone()));

        let result = self.poll_loop(&bot, &client, &own, &tele_tx, &tele_service_tx).await;

        outbound.abort();
        service.abort();

        result
    }

    async fn poll_loop(
        &self,
        bot: &Bot,
        client: &reqwest::Client,
        own: &OwnIdentity,
        tele_tx: &mpsc::Sender<relay::Message>,
        tele_service_tx: &mpsc::Sender<ServiceMessage>,
    ) -> Result<(), TelegramError> {
        let mut offset: i32 = 0;

        loop {
            let updates = bot.get_updates().offset(offset).timeout(60).send().await?;

            for update in updates {
                offset = update.id.0 as i32 + 1;
                self.handle_update(update, bot, client, own, tele_tx, tele_service_tx).await;
            }
        }
    }

    async fn handle_update(
        &self,
        update: Update,
        bot: &Bot,
        client: &reqwest::Client,
        own: &OwnIdentity,
        tele_tx: &mpsc::Sender<relay::Message>,
        tele_service_tx: &mpsc::Sender<ServiceMessage>,
    ) {
        let message = match update.kind {
            UpdateKind::Message(message) | UpdateKind::EditedMessage(message) => message,
            _ => return,
        };

        if message.chat.is_private() {
            self.handle_private(bot, &message).await;
            return;
        }

        if message.chat.id.0 != self.config.group {
            self.handle_misconfigured(bot, &message).await;
            return;
        }

        if self.config.ttl > 0 {
            let age = Utc::now().timestamp() - message.date.timestamp();
            if age > self.config.ttl {
                tracing::debug!(target: "telegram", age, "dropping stale update past ttl");
                return;
            }
        }

        if let Some(text) = message.text() {
            if text.starts_with('/') {
                let ctx = commands::CommandContext { bot, tele_service_tx, config: &self.config };
                commands::dispatch(&ctx, &message, text).await;
                return;
            }
        }

        let mut universal = classify::classify(&message, own);
        resolve_media_url(bot, client, &self.config, &self.data_dir, &mut universal).await;

        if let Some(db) = &self.history {
            let copy = universal.clone();
            let db = db.clone();
            tokio::spawn(async move {
                if let Err(err) = db.history().log(&copy).await {
                    tracing::warn!(target: "telegram", %err, "failed to log message to history");
                }
            });
        }

        let _ = tele_tx.send(universal).await;
    }

    /// Grounded in `telegram.go`'s `processPM`: the bot only operates in
    /// its configured group and politely refuses direct messages.
    async fn handle_private(&self, bot: &Bot, message: &teloxide::types::Message) {
        if let Some(user) = message.from() {
            tracing::info!(target: "telegram", nick = %classify::display_nick(user), "incoming pm ignored");
        }
        let _ = bot
            .send_message(message.chat.id, "Hi! I work only in groups. An only group to be exact.")
            .await;
    }

    /// Grounded in `telegram.go`'s `processChatMessage` misconfiguration
    /// guard: explain, leave, log, discard.
    async fn handle_misconfigured(&self, bot: &Bot, message: &teloxide::types::Message) {
        let notice = format!("I'm not configured to work in this group (group id: {})", message.chat.id.0);
        let _ = bot.send_message(message.chat.id, notice).await;
        if let Err(err) = bot.leave_chat(message.chat.id).await {
            tracing::warn!(target: "telegram", %err, "failed to leave misconfigured group");
        }
        tracing::warn!(target: "telegram", chat_id = message.chat.id.0, "left a group we are not configured for");
    }
}

/// Resolve a classified message's media id into a stored URL, per the
/// storage dispatch in [`media::store`]. No-ops for text-only messages.
async fn resolve_media_url(bot: &Bot, client: &reqwest::Client, config: &TelegramConfig, data_dir: &std::path::Path, msg: &mut relay::Message) {
    let Some(media_id) = msg.extra.get("mediaID").cloned() else { return };

    let file = match bot.get_file(media_id.clone()).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(target: "telegram", %err, "get_file failed");
            return;
        }
    };

    let remote_url = format!("https://api.telegram.org/file/bot{}/{}", config.token, file.path);
    let ext = crate::upload::extension_from_url(&remote_url);
    let file_name = file.path.rsplit('/').next().unwrap_or(&media_id).to_string();

    if let Some(url) = media::store(client, config, data_dir, &media_id, &ext, &remote_url, &file_name).await {
        msg.extra.insert("url".to_string(), url);
    }
}

/// Outbound pump: consumes `IRCh` and renders each universal message as one
/// Telegram `parse_mode=HTML` send, mirroring `irc/outbound.rs`'s pump.
async fn outbound_pump(bot: Bot, mut irc_rx: mpsc::Receiver<relay::Message>, config: TelegramConfig) {
    let group = ChatId(config.group);

    while let Some(msg) = irc_rx.recv().await {
        if msg.extra.get("break").map(String::as_str) == Some("true") {
            return;
        }

        let rendered = render(&msg, &config);
        if let Err(err) = bot.send_message(group, rendered).parse_mode(ParseMode::Html).await {
            tracing::warn!(target: "telegram", %err, "failed to relay message to telegram");
        }
    }
}

/// Render one universal message as Telegram HTML. Service categories use
/// fixed sentence templates; anything else falls back to the default
/// `<prefix><b>nick</b><postfix> text` template.
fn render(msg: &relay::Message, config: &TelegramConfig) -> String {
    let nick = markup::irc_to_telegram_html(&msg.nick);
    let text = markup::irc_to_telegram_html(&msg.text);
    let special = msg.extra.get("special").map(String::as_str).unwrap_or("");

    match special {
        "JOIN" => format!("{nick} joined the channel"),
        "PART" if text.is_empty() => format!("{nick} left the channel"),
        "PART" => format!("{nick} left the channel ({text})"),
        "QUIT" if text.is_empty() => format!("{nick} quit"),
        "QUIT" => format!("{nick} quit ({text})"),
        "NICK" => format!("{nick} is now known as {text}"),
        "KICK" => format!("{nick} was kicked ({text})"),
        "MODE" => format!("{nick} sets mode: {text}"),
        "TOPIC" => format!("{nick} changed the topic to: {text}"),
        "NOTICE" => format!("{}<b>{nick}</b>{} [notice] {text}", config.prefix, config.postfix),
        "ACTION" => format!("<i>{nick} {text}</i>"),
        _ => format!("{}<b>{nick}</b>{} {text}", config.prefix, config.postfix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TelegramConfig {
        TelegramConfig {
            token: String::new(),
            group: 1,
            ttl: 0,
            prefix: "<".to_string(),
            postfix: ">".to_string(),
            allow_bots: true,
            allow_invites: false,
            moderation: true,
            download_media: false,
            storage: "none".to_string(),
            cert_file_path: String::new(),
            key_file_path: String::new(),
            server_port: 8080,
            read_timeout_secs: 100,
            write_timeout_secs: 20,
            base_url: "http://localhost:8080".to_string(),
            data_dir: String::new(),
            pomf: String::new(),
            komf: String::new(),
            komf_public_url: String::new(),
            komf_date: "week".to_string(),
        }
    }

    #[test]
    fn default_template_matches_scenario_b() {
        let msg = relay::Message::new(false, "bob", "hi");
        assert_eq!(render(&msg, &config()), "<<b>bob</b>> hi");
    }

    #[test]
    fn join_uses_fixed_sentence() {
        let msg = relay::Message::new(false, "bob", "").with_extra("special", "JOIN");
        assert_eq!(render(&msg, &config()), "bob joined the channel");
    }

    #[test]
    fn action_is_italicized() {
        let msg = relay::Message::new(false, "bob", "waves").with_extra("special", "ACTION");
        assert_eq!(render(&msg, &config()), "<i>bob waves</i>");
    }
}
