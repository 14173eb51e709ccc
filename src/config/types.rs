//! The three INI sections, deserialized by hand from [`ini::Ini`].
//!
//! The `ini` crate has no `serde`-derive integration, so each section grows a
//! small `from_ini` constructor instead of a blanket `Deserialize` impl; the
//! field set and every default below is lifted key-for-key from
//! `examples/original_source/config/config.go`'s sample configuration.

use ini::{Ini, Properties};
use serde::Deserialize;

use super::defaults;
use super::ConfigError;

fn section<'a>(conf: &'a Ini, name: &'static str) -> Result<&'a Properties, ConfigError> {
    conf.section(Some(name))
        .ok_or(ConfigError::MissingSection(name))
}

fn get_string(props: &Properties, section: &'static str, key: &'static str, default: String) -> String {
    let _ = section;
    props.get(key).map(str::to_string).unwrap_or(default)
}

fn get_bool(
    props: &Properties,
    section: &'static str,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match props.get(key) {
        None | Some("") => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            section,
            key,
            value: v.to_string(),
        }),
    }
}

fn get_num<T: std::str::FromStr>(
    props: &Properties,
    section: &'static str,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match props.get(key) {
        None | Some("") => Ok(default),
        Some(v) => {
            let trimmed = v.split('#').next().unwrap_or(v).trim();
            trimmed.parse().map_err(|_| ConfigError::InvalidValue {
                section,
                key,
                value: v.to_string(),
            })
        }
    }
}

fn get_palette(props: &Properties, default: Vec<String>) -> Vec<String> {
    match props.get("palette") {
        None | Some("") => default,
        Some(v) => v.split(',').map(|s| s.trim().to_string()).collect(),
    }
}

/// `[irchuu]` — common settings: database connection and telemetry opt-ins.
#[derive(Debug, Clone, Deserialize)]
pub struct IrchuuConfig {
    #[serde(default = "defaults::dburi")]
    pub dburi: String,
    #[serde(default = "defaults::sendstats")]
    pub sendstats: bool,
    #[serde(default = "defaults::checkupdates")]
    pub checkupdates: bool,
}

impl IrchuuConfig {
    pub(super) fn from_ini(conf: &Ini) -> Result<Self, ConfigError> {
        let props = section(conf, "irchuu")?;
        Ok(Self {
            dburi: get_string(props, "irchuu", "dburi", defaults::dburi()),
            sendstats: get_bool(props, "irchuu", "sendstats", defaults::sendstats())?,
            checkupdates: get_bool(props, "irchuu", "checkupdates", defaults::checkupdates())?,
        })
    }
}

/// `[irc]` — IRC-side connection, presentation and moderation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    #[serde(default = "defaults::irc_server")]
    pub server: String,
    #[serde(default = "defaults::irc_port")]
    pub port: u16,
    #[serde(default = "defaults::irc_ssl")]
    pub ssl: bool,
    #[serde(default)]
    pub server_password: String,

    #[serde(default = "defaults::irc_nick")]
    pub nick: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "defaults::irc_sasl")]
    pub sasl: bool,

    pub channel: String,
    #[serde(default)]
    pub chan_password: String,

    #[serde(default = "defaults::colorize")]
    pub colorize: bool,
    #[serde(default = "defaults::palette")]
    pub palette: Vec<String>,
    #[serde(default = "defaults::irc_prefix")]
    pub prefix: String,
    #[serde(default = "defaults::irc_postfix")]
    pub postfix: String,
    #[serde(default = "defaults::maxlength")]
    pub max_length: usize,
    #[serde(default = "defaults::ellipsis")]
    pub ellipsis: String,
    #[serde(default = "defaults::flooddelay")]
    pub flood_delay_ms: u64,
    #[serde(default = "defaults::allowstickers")]
    pub allow_stickers: bool,

    #[serde(default = "defaults::irc_moderation")]
    pub moderation: bool,
    #[serde(default = "defaults::kickpermission")]
    pub kick_permission: u8,
    #[serde(default = "defaults::maxhist")]
    pub max_hist: u32,
    #[serde(default = "defaults::namesupdateinterval")]
    pub names_update_interval: u64,
    #[serde(default = "defaults::sendnotices")]
    pub send_notices: bool,
    #[serde(default = "defaults::relayjoinsparts")]
    pub relay_joins_parts: bool,
    #[serde(default = "defaults::relaymodes")]
    pub relay_modes: bool,
    #[serde(default = "defaults::kickrejoin")]
    pub kick_rejoin: bool,
    #[serde(default = "defaults::announcetopic")]
    pub announce_topic: bool,

    #[serde(default = "defaults::debug")]
    pub debug: bool,
}

impl IrcConfig {
    pub(super) fn from_ini(conf: &Ini) -> Result<Self, ConfigError> {
        let props = section(conf, "irc")?;
        let channel = props
            .get("channel")
            .map(str::to_string)
            .ok_or(ConfigError::InvalidValue {
                section: "irc",
                key: "channel",
                value: String::new(),
            })?;

        Ok(Self {
            server: get_string(props, "irc", "server", defaults::irc_server()),
            port: get_num(props, "irc", "port", defaults::irc_port())?,
            ssl: get_bool(props, "irc", "ssl", defaults::irc_ssl())?,
            server_password: get_string(props, "irc", "serverpassword", String::new()),
            nick: get_string(props, "irc", "nick", defaults::irc_nick()),
            password: get_string(props, "irc", "password", String::new()),
            sasl: get_bool(props, "irc", "sasl", defaults::irc_sasl())?,
            channel,
            chan_password: get_string(props, "irc", "chanpassword", String::new()),
            colorize: get_bool(props, "irc", "colorize", defaults::colorize())?,
            palette: get_palette(props, defaults::palette()),
            prefix: get_string(props, "irc", "prefix", defaults::irc_prefix()),
            postfix: get_string(props, "irc", "postfix", defaults::irc_postfix()),
            max_length: get_num(props, "irc", "maxlength", defaults::maxlength())?,
            ellipsis: get_string(props, "irc", "ellipsis", defaults::ellipsis()),
            flood_delay_ms: get_num(props, "irc", "flooddelay", defaults::flooddelay())?,
            allow_stickers: get_bool(props, "irc", "allowstickers", defaults::allowstickers())?,
            moderation: get_bool(props, "irc", "moderation", defaults::irc_moderation())?,
            kick_permission: get_num(props, "irc", "kickpermission", defaults::kickpermission())?,
            max_hist: get_num(props, "irc", "maxhist", defaults::maxhist())?,
            names_update_interval: get_num(
                props,
                "irc",
                "namesupdateinterval",
                defaults::namesupdateinterval(),
            )?,
            send_notices: get_bool(props, "irc", "sendnotices", defaults::sendnotices())?,
            relay_joins_parts: get_bool(
                props,
                "irc",
                "relayjoinsparts",
                defaults::relayjoinsparts(),
            )?,
            relay_modes: get_bool(props, "irc", "relaymodes", defaults::relaymodes())?,
            kick_rejoin: get_bool(props, "irc", "kickrejoin", defaults::kickrejoin())?,
            announce_topic: get_bool(props, "irc", "announcetopic", defaults::announcetopic())?,
            debug: get_bool(props, "irc", "debug", defaults::debug())?,
        })
    }
}

/// `[telegram]` — bot token, group binding, media storage and moderation.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub group: i64,

    #[serde(default = "defaults::telegram_ttl")]
    pub ttl: i64,

    #[serde(default = "defaults::telegram_prefix")]
    pub prefix: String,
    #[serde(default = "defaults::telegram_postfix")]
    pub postfix: String,

    #[serde(default = "defaults::allowbots")]
    pub allow_bots: bool,
    #[serde(default = "defaults::allowinvites")]
    pub allow_invites: bool,
    #[serde(default = "defaults::telegram_moderation")]
    pub moderation: bool,

    #[serde(default = "defaults::downloadmedia")]
    pub download_media: bool,
    #[serde(default = "defaults::storage")]
    pub storage: String,
    #[serde(default)]
    pub cert_file_path: String,
    #[serde(default)]
    pub key_file_path: String,
    #[serde(default = "defaults::serverport")]
    pub server_port: u16,
    #[serde(default = "defaults::readtimeout")]
    pub read_timeout_secs: u64,
    #[serde(default = "defaults::writetimeout")]
    pub write_timeout_secs: u64,
    #[serde(default = "defaults::baseurl")]
    pub base_url: String,
    #[serde(default)]
    pub data_dir: String,
    #[serde(default = "defaults::pomf")]
    pub pomf: String,
    #[serde(default)]
    pub komf: String,
    #[serde(default)]
    pub komf_public_url: String,
    #[serde(default = "defaults::komfdate")]
    pub komf_date: String,
}

impl TelegramConfig {
    pub(super) fn from_ini(conf: &Ini) -> Result<Self, ConfigError> {
        let props = section(conf, "telegram")?;
        let token = props
            .get("token")
            .map(str::to_string)
            .ok_or(ConfigError::InvalidValue {
                section: "telegram",
                key: "token",
                value: String::new(),
            })?;
        let group = get_num(props, "telegram", "group", 0i64)?;
        let komf = get_string(props, "telegram", "komf", String::new());
        // config.go: if komfpublicurl is blank, default to the komf URL itself.
        let komf_public_url = match props.get("komfpublicurl") {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => komf.clone(),
        };

        Ok(Self {
            token,
            group,
            ttl: get_num(props, "telegram", "ttl", defaults::telegram_ttl())?,
            prefix: html_escape(&get_string(
                props,
                "telegram",
                "prefix",
                defaults::telegram_prefix(),
            )),
            postfix: html_escape(&get_string(
                props,
                "telegram",
                "postfix",
                defaults::telegram_postfix(),
            )),
            allow_bots: get_bool(props, "telegram", "allowbots", defaults::allowbots())?,
            allow_invites: get_bool(props, "telegram", "allowinvites", defaults::allowinvites())?,
            moderation: get_bool(
                props,
                "telegram",
                "moderation",
                defaults::telegram_moderation(),
            )?,
            download_media: get_bool(
                props,
                "telegram",
                "downloadmedia",
                defaults::downloadmedia(),
            )?,
            storage: get_string(props, "telegram", "storage", defaults::storage()),
            cert_file_path: get_string(props, "telegram", "certfilepath", String::new()),
            key_file_path: get_string(props, "telegram", "keyfilepath", String::new()),
            server_port: get_num(props, "telegram", "serverport", defaults::serverport())?,
            read_timeout_secs: get_num(props, "telegram", "readtimeout", defaults::readtimeout())?,
            write_timeout_secs: get_num(
                props,
                "telegram",
                "writetimeout",
                defaults::writetimeout(),
            )?,
            base_url: get_string(props, "telegram", "baseurl", defaults::baseurl()),
            data_dir: get_string(props, "telegram", "datadir", String::new()),
            pomf: get_string(props, "telegram", "pomf", defaults::pomf()),
            komf,
            komf_public_url,
            komf_date: get_string(props, "telegram", "komfdate", defaults::komfdate()),
        })
    }
}

/// Minimal HTML entity escaping for the nick prefix/postfix, matching
/// Go's `html.EscapeString` applied to these two fields in `ReadConfig`.
fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '\'' => "&#39;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&#34;".to_string(),
            other => other.to_string(),
        })
        .collect()
}
