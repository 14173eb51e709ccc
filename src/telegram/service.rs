//! Service executor: consumes `IRCServiceCh` and carries out the commands
//! the IRC side asked the Telegram driver to perform, mirroring
//! `irc/service.rs`'s shape for the opposite direction.

use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, InputFile, ParseMode, UserId};
use teloxide::Bot;
use tokio::sync::mpsc;

use crate::config::TelegramConfig;
use crate::relay::ServiceMessage;

use super::classify;

/// Run until a `break` poison pill arrives or the channel closes.
pub async fn run(bot: Bot, mut irc_service_rx: mpsc::Receiver<ServiceMessage>, config: TelegramConfig, tele_service_tx: mpsc::Sender<ServiceMessage>) {
    while let Some(cmd) = irc_service_rx.recv().await {
        if cmd.is_break() {
            return;
        }
        execute(&cmd, &bot, &config, &tele_service_tx).await;
    }
}

async fn execute(cmd: &ServiceMessage, bot: &Bot, config: &TelegramConfig, tele_service_tx: &mpsc::Sender<ServiceMessage>) {
    let group = ChatId(config.group);

    match cmd.command.as_str() {
        "announce" | "bot" => {
            if let Some(text) = cmd.arguments.first() {
                if let Err(err) = bot.send_message(group, text.clone()).parse_mode(ParseMode::Html).await {
                    tracing::warn!(target: "telegram", %err, "failed to send announce");
                }
            }
        }

        "count" => {
            let text = match bot.get_chat_member_count(group).await {
                Ok(count) => format!("{count} members"),
                Err(err) => format!("failed to fetch member count: {err}"),
            };
            let _ = tele_service_tx.send(ServiceMessage::new("announce", vec![text])).await;
        }

        "ops" => {
            let text = list_admins(bot, group).await;
            let _ = tele_service_tx.send(ServiceMessage::new("announce", vec![text])).await;
        }

        "sticker" => {
            if let Some(id) = cmd.arguments.first() {
                if let Err(err) = bot.send_sticker(group, InputFile::file_id(id.clone())).await {
                    tracing::warn!(target: "telegram", %err, "failed to relay sticker");
                }
            }
        }

        "kick" | "unban" => moderate(cmd, bot, group, tele_service_tx).await,

        _ => {}
    }
}

/// List current chat administrators as a human-readable announce line, the
/// Telegram-side answer to `/ops` (issued on either side).
async fn list_admins(bot: &Bot, group: ChatId) -> String {
    match bot.get_chat_administrators(group).await {
        Ok(admins) => {
            if admins.is_empty() {
                return "no administrators".to_string();
            }
            admins.iter().map(|m| classify::display_nick(&m.user)).collect::<Vec<_>>().join(", ")
        }
        Err(err) => format!("failed to list administrators: {err}"),
    }
}

async fn moderate(cmd: &ServiceMessage, bot: &Bot, group: ChatId, tele_service_tx: &mpsc::Sender<ServiceMessage>) {
    let Some(user_id_str) = cmd.arguments.first() else { return };
    let Ok(uid) = user_id_str.parse::<u64>() else { return };
    let user_id = UserId(uid);

    let name = bot
        .get_chat_member(group, user_id)
        .await
        .ok()
        .map(|m| classify::display_nick(&m.user))
        .unwrap_or_else(|| user_id_str.clone());

    let result = if cmd.command == "kick" {
        bot.ban_chat_member(group, user_id).await
    } else {
        bot.unban_chat_member(group, user_id).await
    };

    match result {
        Ok(_) => {
            let verb = if cmd.command == "kick" { "kicked" } else { "unbanned" };
            let _ = tele_service_tx
                .send(ServiceMessage::new("action", vec![format!("{verb} {name}.")]))
                .await;
        }
        Err(err) => {
            let _ = tele_service_tx
                .send(ServiceMessage::new("announce", vec![format!("Telegram API error: {err}")]))
                .await;
        }
    }
}
