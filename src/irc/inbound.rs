//! Inbound translation: turns parsed IRC events into universal
//! `relay::Message`s, maintains the rank table, and routes in-channel and
//! private commands to the dispatcher.

use std::sync::Arc;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use slirc_proto::{irc_eq, ChannelMode, Command, Ctcp, IrcCodec, Message as IrcMessage, Mode, Response};
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::Framed;

use crate::config::IrcConfig;
use crate::db::Database;
use crate::error::IrcError;
use crate::relay::{self, ServiceMessage};

use super::commands::{self, CommandContext};
use super::connection::IrcStream;
use super::ranks::{self, RankTable, ABSENT};
use super::{codec_err, SharedSink};

/// Drive the connection until it closes or we are kicked without
/// `KickRejoin` configured. `joined_tx`, if given, fires the first time the
/// server confirms our own `JOIN` to the configured channel, so the caller
/// can hold off spawning the outbound/service/names-refresh workers until
/// the join is actually confirmed rather than merely requested.
pub async fn dispatch_loop(
    stream: &mut SplitStream<Framed<IrcStream, IrcCodec>>,
    sink: &SharedSink,
    ranks: &Arc<RankTable>,
    config: &IrcConfig,
    history: &Option<Arc<Database>>,
    irc_tx: &mpsc::Sender<relay::Message>,
    irc_service_tx: &mpsc::Sender<ServiceMessage>,
    mut joined_tx: Option<oneshot::Sender<()>>,
) -> Result<(), IrcError> {
    let mut current_nick = config.nick.clone();
    let mut names_in_progress = false;

    loop {
        let msg = match stream.next().await {
            None => return Err(IrcError::ConnectionClosed),
            Some(Err(err)) => {
                tracing::warn!(target: "irc", %err, "failed to parse an incoming line");
                continue;
            }
            Some(Ok(msg)) => msg,
        };

        if config.debug {
            tracing::trace!(target: "irc", command = ?msg.command, "<< received");
        }

        let source = msg.source_nickname().map(str::to_string);

        match &msg.command {
            Command::PING(server, _) => {
                let _ = sink
                    .lock()
                    .await
                    .send(IrcMessage::pong(server.clone()))
                    .await;
            }

            Command::Response(Response::RPL_NAMREPLY, args) => {
                if !names_in_progress {
                    ranks.begin_names_burst();
                    names_in_progress = true;
                }
                if let Some(names) = args.last() {
                    for name in names.split_whitespace() {
                        ranks.record_name(name);
                    }
                }
            }
            Command::Response(Response::RPL_ENDOFNAMES, _) => {
                ranks.end_names_burst();
                names_in_progress = false;
            }

            Command::Response(Response::ERR_CHANOPRIVSNEEDED, _) => {
                let _ = sink
                    .lock()
                    .await
                    .send(IrcMessage::privmsg(
                        config.channel.clone(),
                        "I'm not a channel operator, cannot do that.".to_string(),
                    ))
                    .await;
            }
            Command::Response(resp, _) if resp.is_error() => {
                tracing::info!(target: "irc", numeric = resp.code(), "server error reply");
            }

            Command::PRIVMSG(target, text) => {
                handle_privmsg(
                    &source,
                    target,
                    text,
                    false,
                    sink,
                    ranks,
                    config,
                    history,
                    irc_tx,
                    irc_service_tx,
                    &current_nick,
                )
                .await;
            }
            Command::NOTICE(target, text) => {
                handle_privmsg(
                    &source,
                    target,
                    text,
                    true,
                    sink,
                    ranks,
                    config,
                    history,
                    irc_tx,
                    irc_service_tx,
                    &current_nick,
                )
                .await;
            }

            Command::JOIN(channel, _, _) => {
                if irc_eq(channel, &config.channel) {
                    if let Some(nick) = &source {
                        ranks.on_join(nick);
                        if nick == &current_nick {
                            if let Some(tx) = joined_tx.take() {
                                let _ = tx.send(());
                            }
                        } else if config.relay_joins_parts {
                            enqueue(
                                irc_tx,
                                history,
                                relay::Message::new(false, nick.clone(), String::new())
                                    .with_extra("special", "JOIN"),
                            )
                            .await;
                        }
                    }
                }
            }

            Command::Response(Response::RPL_TOPIC, args) => {
                if config.announce_topic && args.get(1).is_some_and(|c| irc_eq(c, &config.channel)) {
                    let topic = args.last().cloned().unwrap_or_default();
                    enqueue(
                        irc_tx,
                        history,
                        relay::Message::new(false, String::new(), topic)
                            .with_extra("special", "TOPIC"),
                    )
                    .await;
                }
            }

            Command::PART(channel, reason) => {
                if irc_eq(channel, &config.channel) {
                    if let Some(nick) = &source {
                        let was_present = ranks.rank_of(nick) != ABSENT;
                        ranks.on_leave(nick);
                        if config.relay_joins_parts && was_present {
                            let text = reason.clone().unwrap_or_default();
                            enqueue(
                                irc_tx,
                                history,
                                relay::Message::new(false, nick.clone(), text)
                                    .with_extra("special", "PART"),
                            )
                            .await;
                        }
                    }
                }
            }

            Command::QUIT(reason) => {
                if let Some(nick) = &source {
                    let was_present = ranks.rank_of(nick) != ABSENT;
                    ranks.on_leave(nick);
                    if config.relay_joins_parts && was_present {
                        let text = reason.clone().unwrap_or_default();
                        enqueue(
                            irc_tx,
                            history,
                            relay::Message::new(false, nick.clone(), text)
                                .with_extra("special", "QUIT"),
                        )
                        .await;
                    }
                }
            }

            Command::NICK(new_nick) => {
                if let Some(old_nick) = &source {
                    if ranks.rank_of(old_nick) != ABSENT {
                        ranks.on_nick_change(old_nick, new_nick);
                        enqueue(
                            irc_tx,
                            history,
                            relay::Message::new(false, old_nick.clone(), new_nick.clone())
                                .with_extra("special", "NICK"),
                        )
                        .await;
                    }
                    if old_nick == &current_nick {
                        current_nick = new_nick.clone();
                    }
                }
            }

            Command::KICK(channel, kicked, reason) => {
                if irc_eq(channel, &config.channel) {
                    ranks.on_leave(kicked);
                    let by = source.clone().unwrap_or_default();
                    let text = format!("{} ({})", reason.clone().unwrap_or_default(), by);
                    enqueue(
                        irc_tx,
                        history,
                        relay::Message::new(false, kicked.clone(), text)
                            .with_extra("special", "KICK"),
                    )
                    .await;

                    if kicked == &current_nick {
                        tracing::warn!(target: "irc", by = %by, "kicked from the configured channel");
                        if config.kick_rejoin {
                            let rejoin = if config.chan_password.is_empty() {
                                IrcMessage::join(config.channel.clone())
                            } else {
                                IrcMessage::join_with_key(
                                    config.channel.clone(),
                                    config.chan_password.clone(),
                                )
                            };
                            if sink.lock().await.send(rejoin).await.is_err() {
                                return Err(IrcError::ConnectionClosed);
                            }
                        } else {
                            return Err(IrcError::Kicked {
                                channel: config.channel.clone(),
                                by,
                                reason: reason.clone().unwrap_or_default(),
                            });
                        }
                    }
                }
            }

            Command::ChannelMODE(channel, modes) => {
                if irc_eq(channel, &config.channel) {
                    apply_modes(ranks, modes);
                    if config.relay_modes {
                        let rendered = modes
                            .iter()
                            .map(render_mode)
                            .collect::<Vec<_>>()
                            .join(" ");
                        enqueue(
                            irc_tx,
                            history,
                            relay::Message::new(
                                false,
                                source.clone().unwrap_or_default(),
                                rendered,
                            )
                            .with_extra("special", "MODE"),
                        )
                        .await;
                    }
                }
            }

            Command::TOPIC(channel, topic) => {
                if irc_eq(channel, &config.channel) {
                    let text = topic.clone().unwrap_or_default();
                    enqueue(
                        irc_tx,
                        history,
                        relay::Message::new(false, source.clone().unwrap_or_default(), text)
                            .with_extra("special", "TOPIC"),
                    )
                    .await;
                }
            }

            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_privmsg(
    source: &Option<String>,
    target: &str,
    text: &str,
    is_notice: bool,
    sink: &SharedSink,
    ranks: &Arc<RankTable>,
    config: &IrcConfig,
    history: &Option<Arc<Database>>,
    irc_tx: &mpsc::Sender<relay::Message>,
    irc_service_tx: &mpsc::Sender<ServiceMessage>,
    current_nick: &str,
) {
    let Some(nick) = source else { return };

    if Ctcp::is_ctcp(text) {
        let Some(ctcp) = Ctcp::parse(text) else {
            return;
        };
        match ctcp.kind {
            slirc_proto::CtcpKind::Action => {
                if irc_eq(target, &config.channel) {
                    enqueue(
                        irc_tx,
                        history,
                        relay::Message::new(false, nick.clone(), ctcp.params.unwrap_or("").to_string())
                            .with_extra("special", "ACTION"),
                    )
                    .await;
                }
            }
            slirc_proto::CtcpKind::Version => {
                tracing::debug!(target: "irc", %nick, "received CTCP VERSION (not replying)");
            }
            _ => {}
        }
        return;
    }

    if irc_eq(target, &config.channel) {
        if is_notice {
            enqueue(
                irc_tx,
                history,
                relay::Message::new(false, nick.clone(), text.to_string())
                    .with_extra("special", "NOTICE"),
            )
            .await;
            return;
        }

        let command_prefix = format!("{current_nick} ");
        if let Some(rest) = text.strip_prefix(&command_prefix) {
            let ctx = CommandContext {
                sink,
                ranks,
                config,
                history,
                irc_service_tx,
            };
            commands::dispatch(&ctx, nick, rest).await;
            return;
        }

        enqueue(
            irc_tx,
            history,
            relay::Message::new(false, nick.clone(), text.to_string()),
        )
        .await;
        return;
    }

    if irc_eq(target, current_nick) && !is_notice {
        if ranks.rank_of(nick) != ABSENT {
            let ctx = CommandContext {
                sink,
                ranks,
                config,
                history,
                irc_service_tx,
            };
            commands::dispatch(&ctx, nick, text).await;
        } else {
            let reply = IrcMessage::notice(nick.clone(), "I only take commands from channel members.".to_string());
            let _ = sink.lock().await.send(reply).await;
        }
    }
}

/// Render one mode change back to its wire form (`+o nick`), used for the
/// relayed `MODE` announcement text.
fn render_mode(mode: &Mode<ChannelMode>) -> String {
    match mode {
        Mode::Plus(m, Some(arg)) => format!("+{m} {arg}"),
        Mode::Plus(m, None) => format!("+{m}"),
        Mode::Minus(m, Some(arg)) => format!("-{m} {arg}"),
        Mode::Minus(m, None) => format!("-{m}"),
        Mode::NoPrefix(m) => format!("{m}"),
    }
}

/// Walk a parsed MODE change list, updating the rank table. The mode
/// character is read through the type's `Display` impl rather than matched
/// on the enum variant directly, see `ranks::apply_mode_char`.
fn apply_modes(ranks: &Arc<RankTable>, modes: &[Mode<ChannelMode>]) {
    for mode in modes {
        let (plus, mode_type, arg) = match mode {
            Mode::Plus(m, arg) => (true, m, arg.as_deref()),
            Mode::Minus(m, arg) => (false, m, arg.as_deref()),
            Mode::NoPrefix(_) => continue,
        };
        let mode_char = format!("{mode_type}").chars().next().unwrap_or('?');
        if ranks::rank_for_mode_char(mode_char).is_some() {
            ranks.apply_mode_char(plus, mode_char, arg);
        }
    }
}

async fn enqueue(
    irc_tx: &mpsc::Sender<relay::Message>,
    history: &Option<Arc<Database>>,
    msg: relay::Message,
) {
    if let Some(db) = history.clone() {
        let copy = msg.clone();
        tokio::spawn(async move {
            if let Err(err) = db.history().log(&copy).await {
                tracing::warn!(target: "irc", %err, "failed to log message to history");
            }
        });
    }
    let _ = irc_tx.send(msg).await;
}
