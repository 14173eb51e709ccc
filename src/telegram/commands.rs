//! Slash-command dispatch for the configured Telegram group.
//!
//! Mirrors `irc/commands.rs`'s shape: a small context struct, a flat match
//! on the command word, and a `request` helper that just posts a
//! `ServiceMessage` rather than acting directly.

use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatMemberKind, Message};
use teloxide::Bot;
use tokio::sync::mpsc;

use crate::config::TelegramConfig;
use crate::relay::ServiceMessage;

use super::classify::display_nick;

const HELP_TEXT: &str = "commands: /help, /version, /ops, /bot <text>, /kick <nick>, /invite <nick>, /topic";

pub struct CommandContext<'a> {
    pub bot: &'a Bot,
    pub tele_service_tx: &'a mpsc::Sender<ServiceMessage>,
    pub config: &'a TelegramConfig,
}

/// Dispatch one slash-command line, e.g. `"/kick alice"` or
/// `"/topic@irchuu_bot"`. `text` is the raw message text, command included.
pub async fn dispatch(ctx: &CommandContext<'_>, message: &Message, text: &str) {
    let mut parts = text.splitn(2, char::is_whitespace);
    let Some(raw_cmd) = parts.next() else { return };
    let cmd = raw_cmd.split('@').next().unwrap_or(raw_cmd);
    let rest = parts.next().unwrap_or("").trim();

    match cmd {
        "/help" => {
            let _ = reply(ctx, message, HELP_TEXT).await;
        }
        "/version" => {
            let _ = reply(ctx, message, concat!("irchuu bridge ", env!("CARGO_PKG_VERSION"))).await;
        }
        "/bot" => {
            if !ctx.config.allow_bots {
                return;
            }
            if !rest.is_empty() {
                request(ctx, "announce", vec![rest.to_string()]).await;
            }
        }
        "/ops" => request(ctx, "ops", vec![]).await,

        "/kick" | "/invite" | "/topic" => {
            if !is_admin(ctx, message).await {
                let _ = reply(ctx, message, "only group admins can do that").await;
                return;
            }
            match cmd {
                "/kick" if !rest.is_empty() => {
                    if !ctx.config.moderation {
                        return;
                    }
                    let requester = message.from().map(display_nick).unwrap_or_default();
                    request(ctx, "kick", vec![rest.to_string(), requester]).await;
                }
                "/invite" if !rest.is_empty() => {
                    if !ctx.config.allow_invites {
                        return;
                    }
                    request(ctx, "invite", vec![rest.to_string()]).await;
                }
                "/topic" => request(ctx, "topic", vec![]).await,
                _ => {}
            }
        }

        _ => {}
    }
}

async fn request(ctx: &CommandContext<'_>, command: &str, arguments: Vec<String>) {
    let _ = ctx.tele_service_tx.send(ServiceMessage::new(command, arguments)).await;
}

/// Telegram chat-membership check: only `administrator`/`creator` may run
/// moderation slash-commands.
async fn is_admin(ctx: &CommandContext<'_>, message: &Message) -> bool {
    let Some(user) = message.from() else { return false };
    match ctx.bot.get_chat_member(message.chat.id, user.id).send().await {
        Ok(member) => matches!(member.kind, ChatMemberKind::Administrator(_) | ChatMemberKind::Owner(_)),
        Err(err) => {
            tracing::warn!(target: "telegram", %err, "get_chat_member failed");
            false
        }
    }
}

async fn reply(ctx: &CommandContext<'_>, message: &Message, text: &str) -> Result<(), teloxide::RequestError> {
    ctx.bot.send_message(message.chat.id, text.to_string()).reply_to_message_id(message.id).await?;
    Ok(())
}
