//! Outbound pump: consumes `TeleCh` (Telegram → IRC messages) and
//! transmits paced, wire-safe `PRIVMSG`s to the configured channel.

use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use slirc_proto::{Ctcp, Message as IrcMessage};

use crate::config::IrcConfig;
use crate::relay;

use super::{colorize, splitter, SharedSink};

/// Render the sender's display name: truncated to `max_length` (with the
/// configured ellipsis), colorized if enabled, then wrapped in
/// `prefix`/`postfix`.
pub fn render_name(msg: &relay::Message, config: &IrcConfig) -> String {
    let mut name = msg.name();
    let max_len = config.max_length;
    if name.chars().count() > max_len {
        name = name.chars().take(max_len).collect::<String>();
        name.push_str(&config.ellipsis);
    }
    if config.colorize {
        name = colorize::colorize(&name, &config.palette);
    }
    format!("{}{}{}", config.prefix, name, config.postfix)
}

/// Run until the channel closes or a poison-pill message (`extra["break"]
/// == "true"`) arrives.
pub async fn run(sink: SharedSink, mut tele_rx: mpsc::Receiver<relay::Message>, config: IrcConfig) {
    let mut first = true;

    while let Some(msg) = tele_rx.recv().await {
        if msg.extra.get("break").map(String::as_str) == Some("true") {
            return;
        }

        let is_action = msg.extra.get("special").map(String::as_str) == Some("ACTION");
        let name = render_name(&msg, &config);

        let lines = if is_action {
            vec![format!("{} {}", name, msg.text)]
        } else {
            let prefix = format!("{name} ");
            let budget = splitter::privmsg_budget(prefix.len(), config.channel.len(), 0);
            splitter::split_lines(&msg.text, budget, "")
                .into_iter()
                .map(|line| format!("{prefix}{line}"))
                .collect()
        };

        for line in lines {
            if !first {
                sleep(Duration::from_millis(config.flood_delay_ms)).await;
            }
            first = false;

            let wire = if is_action {
                IrcMessage::privmsg(config.channel.clone(), Ctcp::action(&line).to_string())
            } else {
                IrcMessage::privmsg(config.channel.clone(), line)
            };

            if config.debug {
                tracing::trace!(target: "irc", command = ?wire.command, ">> sending");
            }

            if sink.lock().await.send(wire).await.is_err() {
                return;
            }
        }
    }
}
