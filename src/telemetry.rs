//! Startup update-check and opt-in usage telemetry.
//!
//! Grounded in `hq/hq.go`'s `Report`/`captureData`, but implements the
//! richer contract of the external interfaces section: the fixed URL now
//! returns a JSON array of `[latest_layer, telemetry_endpoint, changelog_url, ...]`
//! rather than a bare integer body, and stats are POSTed as a JSON object
//! instead of form data.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::{IrcConfig, IrchuuConfig, TelegramConfig, LAYER};

/// Fixed HQ endpoint, unchanged from the original implementation.
const HQ_URL: &str = "https://kotobank.ch/irchuu/z";

#[derive(Debug, Serialize)]
struct StatsPayload {
    text: String,
}

/// Run the startup telemetry flow: an update check, an opt-in stats report,
/// or both. No-ops entirely if both `checkupdates` and `sendstats` are
/// disabled, matching `hq.go`'s top-level guard.
pub async fn check_and_report(irchuu: &IrchuuConfig, irc: &IrcConfig, telegram: &TelegramConfig) {
    if !irchuu.checkupdates && !irchuu.sendstats {
        return;
    }

    let client = reqwest::Client::new();

    let hq_response = match client.get(HQ_URL).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(target: "server", error = %e, "failed to reach HQ (update check / stats sharing unavailable)");
            return;
        }
    };

    let body: Value = match hq_response.json().await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(target: "server", error = %e, "HQ returned an unparseable response");
            return;
        }
    };

    let entries = body.as_array().cloned().unwrap_or_default();
    let latest_layer = entries.first().and_then(Value::as_u64).map(|n| n as u32);
    let telemetry_endpoint = entries.get(1).and_then(Value::as_str).map(str::to_string);
    let changelog_url = entries.get(2).and_then(Value::as_str).map(str::to_string);

    if irchuu.sendstats {
        if let Some(endpoint) = telemetry_endpoint.as_deref() {
            report_stats(&client, endpoint, telegram, irc).await;
        }
    }

    if irchuu.checkupdates {
        match latest_layer {
            Some(latest) if latest > LAYER => {
                tracing::info!(target: "server", latest_layer = latest, our_layer = LAYER, "a new version is available");
                if let Some(url) = changelog_url {
                    stream_changelog(&client, &url).await;
                }
            }
            Some(_) => tracing::info!(target: "server", "using the latest version"),
            None => tracing::warn!(target: "server", "HQ response was malformed, can't check for updates"),
        }
    }
}

async fn report_stats(
    client: &reqwest::Client,
    endpoint: &str,
    telegram: &TelegramConfig,
    irc: &IrcConfig,
) {
    let tg_hash = truncated_sha256(telegram.group.to_string().as_bytes());
    let irc_hash = truncated_sha256(irc.channel.as_bytes());

    let text = format!("launched with tg: {tg_hash}, irc: {irc_hash}, layer: {LAYER}");

    if let Err(e) = client
        .post(endpoint)
        .json(&StatsPayload { text })
        .send()
        .await
    {
        tracing::warn!(target: "server", error = %e, "failed to report usage stats to HQ");
    }
}

/// Print only the part of the changelog preceding our own layer's marker
/// line (`## <layer>`), so operators see just what's new since their build.
async fn stream_changelog(client: &reqwest::Client, url: &str) {
    let Ok(resp) = client.get(url).send().await else {
        return;
    };
    let Ok(text) = resp.text().await else {
        return;
    };

    let marker = format!("## {LAYER}");
    let fragment: String = text
        .lines()
        .take_while(|line| !line.trim().starts_with(&marker))
        .collect::<Vec<_>>()
        .join("\n");

    if !fragment.trim().is_empty() {
        println!("{fragment}");
    }
}

/// First 31 bytes of the SHA-256 digest, base64-encoded. Deliberately one
/// byte short of the full digest to limit identifiability of the reported
/// group/channel while still making collisions practically impossible.
fn truncated_sha256(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    BASE64.encode(&digest[..31])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_hash_is_31_bytes_of_digest() {
        let full = Sha256::digest(b"#irchuu");
        let expected = BASE64.encode(&full[..31]);
        assert_eq!(truncated_sha256(b"#irchuu"), expected);
    }

    #[test]
    fn truncated_hash_is_deterministic() {
        assert_eq!(truncated_sha256(b"7654321"), truncated_sha256(b"7654321"));
        assert_ne!(truncated_sha256(b"7654321"), truncated_sha256(b"7654322"));
    }
}
