//! In-channel command dispatch, triggered by a `PRIVMSG` to the channel
//! whose text starts with `"<ownnick> "`.

use std::sync::Arc;

use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use slirc_proto::Message as IrcMessage;

use crate::config::IrcConfig;
use crate::db::Database;
use crate::relay::ServiceMessage;

use super::ranks::RankTable;
use super::{splitter, SharedSink};

const HELP_TEXT: &[&str] = &[
    "commands: help, hist [n], ops, count, kick <name>, unban <name>, sticker <id>",
    "kick/unban resolve a Telegram display name via the message history log",
];

pub struct CommandContext<'a> {
    pub sink: &'a SharedSink,
    pub ranks: &'a Arc<RankTable>,
    pub config: &'a IrcConfig,
    pub history: &'a Option<Arc<Database>>,
    pub irc_service_tx: &'a mpsc::Sender<ServiceMessage>,
}

/// Dispatch one in-channel command line (already stripped of the
/// `"<ownnick> "` prefix) issued by `requester`.
pub async fn dispatch(ctx: &CommandContext<'_>, requester: &str, line: &str) {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else { return };
    let rest: Vec<&str> = parts.collect();

    match cmd {
        "help" => help(ctx).await,
        "hist" => hist(ctx, requester, rest.first().copied()).await,
        "ops" => request(ctx, "ops", vec![]).await,
        "count" => request(ctx, "count", vec![]).await,
        "kick" => moderate(ctx, requester, "kick", rest.first().copied()).await,
        "unban" => moderate(ctx, requester, "unban", rest.first().copied()).await,
        "sticker" => sticker(ctx, rest.first().copied()).await,
        _ => {}
    }
}

async fn help(ctx: &CommandContext<'_>) {
    for line in HELP_TEXT {
        let _ = reply_to_channel(ctx, line).await;
        sleep(Duration::from_millis(ctx.config.flood_delay_ms)).await;
    }
}

async fn hist(ctx: &CommandContext<'_>, requester: &str, n: Option<&str>) {
    let Some(db) = ctx.history else {
        let _ = private_send(ctx, requester, "no history log is configured").await;
        return;
    };

    let requested: u32 = n.and_then(|v| v.parse().ok()).unwrap_or(ctx.config.max_hist);
    let limit = requested.min(ctx.config.max_hist).max(1);

    match db.history().recent(limit).await {
        Ok(entries) => {
            let budget = splitter::privmsg_budget(0, requester.len(), 0);
            for entry in entries {
                let line = format!("[{}] {}: {}", entry.date.format("%H:%M"), entry.nick, entry.text);
                for piece in splitter::split_lines(&line, budget, "") {
                    let _ = private_send(ctx, requester, &piece).await;
                }
            }
        }
        Err(err) => {
            tracing::warn!(target: "irc", %err, "hist query failed");
            let _ = private_send(ctx, requester, "history lookup failed").await;
        }
    }
}

async fn request(ctx: &CommandContext<'_>, command: &str, arguments: Vec<String>) {
    let _ = ctx
        .irc_service_tx
        .send(ServiceMessage::new(command, arguments))
        .await;
}

async fn moderate(ctx: &CommandContext<'_>, requester: &str, command: &str, name: Option<&str>) {
    if !ctx.config.moderation {
        return;
    }
    if ctx.ranks.rank_of(requester) < ctx.config.kick_permission {
        let _ = private_send(ctx, requester, "you don't have permission for that").await;
        return;
    }
    let Some(name) = name else { return };
    let Some(db) = ctx.history else {
        let _ = private_send(ctx, requester, "no history log is configured").await;
        return;
    };

    match db.history().find_user(name).await {
        Ok(Some(found)) => {
            request(
                ctx,
                command,
                vec![found.id.to_string(), requester.to_string()],
            )
            .await;
        }
        Ok(None) => {
            let _ = private_send(ctx, requester, "no such user").await;
        }
        Err(err) => {
            tracing::warn!(target: "irc", %err, "find_user query failed");
            let _ = private_send(ctx, requester, "lookup failed").await;
        }
    }
}

async fn sticker(ctx: &CommandContext<'_>, id: Option<&str>) {
    if !ctx.config.allow_stickers {
        return;
    }
    if let Some(id) = id {
        request(ctx, "sticker", vec![id.to_string()]).await;
    }
}

async fn reply_to_channel(ctx: &CommandContext<'_>, text: &str) -> Result<(), ()> {
    let msg = IrcMessage::privmsg(ctx.config.channel.clone(), text.to_string());
    if ctx.config.debug {
        tracing::trace!(target: "irc", command = ?msg.command, ">> sending");
    }
    ctx.sink.lock().await.send(msg).await.map_err(|_| ())
}

/// Privately reply to `requester`, as a NOTICE or PRIVMSG depending on
/// `sendnotices`.
async fn private_send(ctx: &CommandContext<'_>, requester: &str, text: &str) -> Result<(), ()> {
    let msg = if ctx.config.send_notices {
        IrcMessage::notice(requester.to_string(), text.to_string())
    } else {
        IrcMessage::privmsg(requester.to_string(), text.to_string())
    };
    if ctx.config.debug {
        tracing::trace!(target: "irc", command = ?msg.command, ">> sending");
    }
    ctx.sink.lock().await.send(msg).await.map_err(|_| ())
}
