//! Service executor: consumes `TeleServiceCh` and carries out the commands
//! the Telegram side asked the IRC driver to perform.

use std::sync::Arc;

use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use slirc_proto::{Ctcp, Message as IrcMessage};

use crate::config::IrcConfig;
use crate::db::Database;
use crate::relay::ServiceMessage;

use super::ranks::{RankTable, ABSENT};
use super::SharedSink;

/// Run until a `break` poison pill arrives or the channel closes.
pub async fn run(
    sink: SharedSink,
    mut tele_service_rx: mpsc::Receiver<ServiceMessage>,
    ranks: Arc<RankTable>,
    config: IrcConfig,
    irc_service_tx: mpsc::Sender<ServiceMessage>,
    history: Option<Arc<Database>>,
) {
    while let Some(cmd) = tele_service_rx.recv().await {
        if cmd.is_break() {
            return;
        }

        execute(&cmd, &sink, &ranks, &config, &irc_service_tx, &history).await;

        if config.flood_delay_ms > 0 {
            sleep(Duration::from_millis(config.flood_delay_ms)).await;
        }

        if cmd.command == "shutdown" {
            return;
        }
    }
}

async fn execute(
    cmd: &ServiceMessage,
    sink: &SharedSink,
    ranks: &Arc<RankTable>,
    config: &IrcConfig,
    irc_service_tx: &mpsc::Sender<ServiceMessage>,
    history: &Option<Arc<Database>>,
) {
    match cmd.command.as_str() {
        "announce" | "bot" => {
            if let Some(text) = cmd.arguments.first() {
                let _ = send(sink, config, IrcMessage::privmsg(config.channel.clone(), text.clone())).await;
            }
        }

        "action" => {
            if let Some(text) = cmd.arguments.first() {
                let body = Ctcp::action(text).to_string();
                let _ = send(sink, config, IrcMessage::privmsg(config.channel.clone(), body)).await;
            }
        }

        "kick" => {
            let (Some(nick), Some(requester)) = (cmd.arguments.first(), cmd.arguments.get(1))
            else {
                return;
            };
            if nick.eq_ignore_ascii_case(&config.nick) {
                return;
            }
            let _ = send(
                sink,
                config,
                IrcMessage::kick_with_reason(
                    config.channel.clone(),
                    nick.clone(),
                    format!("by {requester}"),
                ),
            )
            .await;
        }

        "ops" => {
            let announce = ops_announce(ranks);
            let _ = irc_service_tx
                .send(ServiceMessage::new("announce", vec![announce]))
                .await;
        }

        "invite" => {
            if let Some(nick) = cmd.arguments.first() {
                let msg = IrcMessage::new(None, "INVITE", vec![nick.as_str(), config.channel.as_str()]);
                if let Ok(msg) = msg {
                    let _ = send(sink, config, msg).await;
                }
            }
        }

        "topic" => {
            let msg = IrcMessage::new(None, "TOPIC", vec![config.channel.as_str()]);
            if let Ok(msg) = msg {
                let _ = send(sink, config, msg).await;
            }
        }

        "shutdown" => {
            tracing::info!(target: "irc", "shutdown requested, closing up");
            if let Some(db) = history {
                db.pool().close().await;
            }
            let _ = send(sink, config, IrcMessage::quit_with_message("shutting down")).await;
            // Give the socket a moment to flush the QUIT before the process exits.
            sleep(Duration::from_millis(200)).await;
            std::process::exit(0);
        }

        _ => {}
    }
}

/// List currently-ranked members as a human-readable announce line, for the
/// IRC-side reply to a Telegram `/ops`.
fn ops_announce(ranks: &Arc<RankTable>) -> String {
    let mut members: Vec<_> = ranks
        .snapshot()
        .into_iter()
        .filter(|(_, rank)| *rank != ABSENT)
        .collect();
    members.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if members.is_empty() {
        return "no tracked members".to_string();
    }
    members
        .into_iter()
        .map(|(nick, rank)| format!("{nick} ({rank})"))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn send(sink: &SharedSink, config: &IrcConfig, msg: IrcMessage) -> Result<(), ()> {
    if config.debug {
        tracing::trace!(target: "irc", command = ?msg.command, ">> sending");
    }
    sink.lock().await.send(msg).await.map_err(|_| ())
}
