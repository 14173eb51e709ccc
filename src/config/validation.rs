//! Cross-field validation, run once after the three sections are parsed.
//!
//! Mirrors `slircd-ng`'s `config/validation.rs`: a `ValidationError` enum plus
//! a `validate` function that collects every violation instead of
//! failing fast on the first one, so a misconfigured instance gets a
//! complete error report on its first run.

use thiserror::Error;

use super::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("[irc] channel must start with '#' (got {0:?})")]
    ChannelMissingHash(String),
    #[error("[irc] kickpermission must be between 1 and 6 (got {0})")]
    KickPermissionOutOfRange(u8),
    #[error("[telegram] storage must be one of none, server, pomf, komf (got {0:?})")]
    UnknownStorage(String),
    #[error("[telegram] storage=server requires baseurl to be set")]
    ServerStorageMissingBaseUrl,
    #[error("[telegram] storage=pomf requires pomf to be set")]
    PomfStorageMissingUrl,
    #[error("[telegram] storage=komf requires komf to be set")]
    KomfStorageMissingUrl,
    #[error("[telegram] token must not be blank")]
    BlankToken,
    #[error("[telegram] group must not be zero")]
    ZeroGroup,
    #[error("[irc] palette must not be empty when colorize = true")]
    EmptyPalette,
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.irc.channel.starts_with('#') {
        errors.push(ValidationError::ChannelMissingHash(
            config.irc.channel.clone(),
        ));
    }

    if !(1..=6).contains(&config.irc.kick_permission) {
        errors.push(ValidationError::KickPermissionOutOfRange(
            config.irc.kick_permission,
        ));
    }

    if config.irc.colorize && config.irc.palette.is_empty() {
        errors.push(ValidationError::EmptyPalette);
    }

    if config.telegram.token.trim().is_empty() {
        errors.push(ValidationError::BlankToken);
    }

    if config.telegram.group == 0 {
        errors.push(ValidationError::ZeroGroup);
    }

    match config.telegram.storage.as_str() {
        "none" => {}
        "server" => {
            if config.telegram.base_url.trim().is_empty() {
                errors.push(ValidationError::ServerStorageMissingBaseUrl);
            }
        }
        "pomf" => {
            if config.telegram.pomf.trim().is_empty() {
                errors.push(ValidationError::PomfStorageMissingUrl);
            }
        }
        "komf" => {
            if config.telegram.komf.trim().is_empty() {
                errors.push(ValidationError::KomfStorageMissingUrl);
            }
        }
        other => errors.push(ValidationError::UnknownStorage(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IrcConfig, IrchuuConfig, TelegramConfig};

    fn base_config() -> Config {
        Config {
            irchuu: IrchuuConfig {
                dburi: String::new(),
                sendstats: true,
                checkupdates: true,
            },
            irc: IrcConfig {
                server: "irc.rizon.net".into(),
                port: 6667,
                ssl: false,
                server_password: String::new(),
                nick: "irchuu".into(),
                password: String::new(),
                sasl: false,
                channel: "#irchuu".into(),
                chan_password: String::new(),
                colorize: true,
                palette: vec!["1".into()],
                prefix: "<".into(),
                postfix: ">".into(),
                max_length: 18,
                ellipsis: "… ".into(),
                flood_delay_ms: 500,
                allow_stickers: true,
                moderation: true,
                kick_permission: 4,
                max_hist: 40,
                names_update_interval: 600,
                send_notices: true,
                relay_joins_parts: true,
                relay_modes: true,
                kick_rejoin: true,
                announce_topic: true,
                debug: false,
            },
            telegram: TelegramConfig {
                token: "abc:123".into(),
                group: -1001,
                ttl: 300,
                prefix: "<".into(),
                postfix: ">".into(),
                allow_bots: true,
                allow_invites: false,
                moderation: true,
                download_media: false,
                storage: "none".into(),
                cert_file_path: String::new(),
                key_file_path: String::new(),
                server_port: 8080,
                read_timeout_secs: 100,
                write_timeout_secs: 20,
                base_url: "http://localhost:8080".into(),
                data_dir: String::new(),
                pomf: "https://p.fuwafuwa.moe".into(),
                komf: String::new(),
                komf_public_url: String::new(),
                komf_date: "week".into(),
            },
        }
    }

    #[test]
    fn accepts_default_like_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn rejects_channel_without_hash() {
        let mut c = base_config();
        c.irc.channel = "irchuu".into();
        let errs = validate(&c).unwrap_err();
        assert!(errs.contains(&ValidationError::ChannelMissingHash("irchuu".into())));
    }

    #[test]
    fn rejects_out_of_range_kick_permission() {
        let mut c = base_config();
        c.irc.kick_permission = 0;
        let errs = validate(&c).unwrap_err();
        assert!(errs.contains(&ValidationError::KickPermissionOutOfRange(0)));
    }

    #[test]
    fn rejects_pomf_storage_without_url() {
        let mut c = base_config();
        c.telegram.storage = "pomf".into();
        c.telegram.pomf = String::new();
        let errs = validate(&c).unwrap_err();
        assert!(errs.contains(&ValidationError::PomfStorageMissingUrl));
    }

    #[test]
    fn collects_multiple_errors_at_once() {
        let mut c = base_config();
        c.irc.channel = "bad".into();
        c.irc.kick_permission = 9;
        let errs = validate(&c).unwrap_err();
        assert_eq!(errs.len(), 2);
    }
}
