//! The IRC side of the bridge: connect/auth/join lifecycle, channel rank
//! tracking, command dispatch and the paced outbound pump.
//!
//! The driver owns the TCP/TLS socket and the rank table; everything else
//! (the Telegram driver, the history log) only ever sees it through the
//! relay's bounded channels, per the single-owner concurrency contract.

pub mod colorize;
pub mod commands;
pub mod connection;
pub mod inbound;
pub mod outbound;
pub mod ranks;
pub mod service;
pub mod splitter;

use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::time::{sleep, Duration};
use tokio_util::codec::Framed;

use slirc_proto::{encode_plain, CapSubCommand, Command, IrcCodec, Message as IrcMessage, Response};

use crate::config::IrcConfig;
use crate::db::Database;
use crate::error::IrcError;
use crate::relay;

use connection::IrcStream;
use ranks::RankTable;

/// The write half of the connection, shared by the main dispatch loop, the
/// outbound pump and the service executor behind an async mutex — the
/// "guard the shared resource with a lock" option the concurrency model
/// explicitly allows for state touched from more than one task.
pub type SharedSink = Arc<AsyncMutex<SplitSink<Framed<IrcStream, IrcCodec>, IrcMessage>>>;

fn codec_err(e: impl std::fmt::Display) -> IrcError {
    IrcError::Codec(std::io::Error::other(e.to_string()))
}

pub struct IrcDriver {
    config: IrcConfig,
    history: Option<Arc<Database>>,
}

impl IrcDriver {
    pub fn new(config: IrcConfig, history: Option<Arc<Database>>) -> Self {
        Self { config, history }
    }

    /// Run the driver to completion. Returns `Ok(())` only after a clean
    /// `shutdown` service command; any other termination (socket error,
    /// channel closed) is returned as an error for `main` to log.
    pub async fn run(
        self,
        tele_rx: mpsc::Receiver<relay::Message>,
        tele_service_rx: mpsc::Receiver<relay::ServiceMessage>,
        irc_tx: mpsc::Sender<relay::Message>,
        irc_service_tx: mpsc::Sender<relay::ServiceMessage>,
    ) -> Result<(), IrcError> {
        let mut framed = connection::dial(&self.config).await?;
        let nick = self.register(&mut framed).await?;
        self.join_configured_channel(&mut framed).await?;

        let (sink, mut stream) = framed.split();
        let sink: SharedSink = Arc::new(AsyncMutex::new(sink));
        let ranks = Arc::new(RankTable::new());

        let (joined_tx, joined_rx) = oneshot::channel();

        let dispatch_sink = sink.clone();
        let dispatch_ranks = ranks.clone();
        let dispatch_config = self.config.clone();
        let dispatch_history = self.history.clone();
        let dispatch_irc_tx = irc_tx.clone();
        let dispatch_irc_service_tx = irc_service_tx.clone();

        let dispatch = tokio::spawn(async move {
            inbound::dispatch_loop(
                &mut stream,
                &dispatch_sink,
                &dispatch_ranks,
                &dispatch_config,
                &dispatch_history,
                &dispatch_irc_tx,
                &dispatch_irc_service_tx,
                Some(joined_tx),
            )
            .await
        });

        // Hold off starting the outbound/service/names-refresh workers until
        // the server actually confirms our JOIN; a rejected join (+i/+k/ban)
        // must not leave them running as though the bridge were live.
        if joined_rx.await.is_err() {
            return dispatch.await.map_err(|_| IrcError::ConnectionClosed)?;
        }

        tracing::info!(target: "irc", %nick, channel = %self.config.channel, "joined channel");

        let outbound = tokio::spawn(outbound::run(sink.clone(), tele_rx, self.config.clone()));
        let service = tokio::spawn(service::run(
            sink.clone(),
            tele_service_rx,
            ranks.clone(),
            self.config.clone(),
            irc_service_tx.clone(),
            self.history.clone(),
        ));
        let names_refresh = tokio::spawn(names_refresher(sink.clone(), self.config.clone()));

        let result = dispatch.await.map_err(|_| IrcError::ConnectionClosed)?;

        outbound.abort();
        service.abort();
        names_refresh.abort();

        result
    }

    /// `PASS`/`CAP REQ sasl`/`NICK`/`USER`, then drive the registration
    /// reply stream until `RPL_WELCOME`, retrying the nick on 433 and
    /// running the SASL PLAIN exchange if configured. Returns the nick the
    /// server actually accepted.
    async fn register(
        &self,
        framed: &mut Framed<IrcStream, IrcCodec>,
    ) -> Result<String, IrcError> {
        let use_sasl = self.config.sasl && !self.config.password.is_empty();
        let mut nick = self.config.nick.clone();

        if use_sasl {
            send(framed, &self.config, raw("CAP", vec!["REQ", "sasl"])?).await?;
        }
        if !self.config.server_password.is_empty() {
            send(framed, &self.config, raw("PASS", vec![&self.config.server_password])?).await?;
        }
        send(framed, &self.config, IrcMessage::nick(nick.clone())).await?;
        send(framed, &self.config, IrcMessage::user(nick.clone(), "IRChuu~")).await?;

        loop {
            let msg = framed
                .next()
                .await
                .ok_or(IrcError::ConnectionClosed)?
                .map_err(codec_err)?;

            if self.config.debug {
                tracing::trace!(target: "irc", command = ?msg.command, "<< received");
            }

            match &msg.command {
                Command::PING(server, _) => {
                    send(framed, &self.config, IrcMessage::pong(server.clone())).await?;
                }
                Command::Response(Response::ERR_NICKNAMEINUSE, _) => {
                    nick.push('_');
                    send(framed, &self.config, IrcMessage::nick(nick.clone())).await?;
                }
                Command::CAP(_, CapSubCommand::ACK, _, Some(acked)) if acked.contains("sasl") => {
                    send(framed, &self.config, raw("AUTHENTICATE", vec!["PLAIN"])?).await?;
                }
                Command::AUTHENTICATE(param) if param == "+" => {
                    let payload = encode_plain(&nick, &self.config.password);
                    send(framed, &self.config, raw("AUTHENTICATE", vec![&payload])?).await?;
                }
                Command::Response(Response::RPL_SASLSUCCESS, _)
                | Command::Response(Response::ERR_SASLFAIL, _) => {
                    send(framed, &self.config, raw("CAP", vec!["END"])?).await?;
                }
                Command::Response(Response::RPL_WELCOME, _) => {
                    if !use_sasl && !self.config.password.is_empty() {
                        send(
                            framed,
                            &self.config,
                            IrcMessage::privmsg(
                                "NickServ",
                                format!("IDENTIFY {}", self.config.password),
                            ),
                        )
                        .await?;
                    }
                    return Ok(nick);
                }
                _ => {}
            }
        }
    }

    async fn join_configured_channel(
        &self,
        framed: &mut Framed<IrcStream, IrcCodec>,
    ) -> Result<(), IrcError> {
        if self.config.chan_password.is_empty() {
            send(framed, &self.config, IrcMessage::join(self.config.channel.clone())).await
        } else {
            send(
                framed,
                &self.config,
                IrcMessage::join_with_key(
                    self.config.channel.clone(),
                    self.config.chan_password.clone(),
                ),
            )
            .await
        }
    }
}

async fn send(
    framed: &mut Framed<IrcStream, IrcCodec>,
    config: &IrcConfig,
    msg: IrcMessage,
) -> Result<(), IrcError> {
    if config.debug {
        tracing::trace!(target: "irc", command = ?msg.command, ">> sending");
    }
    framed.send(msg).await.map_err(codec_err)
}

fn raw(command: &str, args: Vec<&str>) -> Result<IrcMessage, IrcError> {
    IrcMessage::new(None, command, args).map_err(codec_err)
}

/// Sleeps `names_update_interval` seconds then re-issues `NAMES <channel>`,
/// forever, per the channel lifecycle's third long-lived worker.
async fn names_refresher(sink: SharedSink, config: IrcConfig) {
    loop {
        sleep(Duration::from_secs(config.names_update_interval)).await;
        let Ok(msg) = raw("NAMES", vec![&config.channel]) else {
            continue;
        };
        if sink.lock().await.send(msg).await.is_err() {
            return;
        }
    }
}
