//! Default values for every recognized INI key, mirroring the sample
//! configuration embedded in `PopulateConfig` (`examples/original_source/config/config.go`).
//!
//! Each function is deliberately tiny and named after the key it backs,
//! following `slircd-ng`'s `config/defaults.rs` convention of one
//! `default_*` function per `#[serde(default = "...")]` field.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Integer version used when comparing against the HQ server's latest layer.
pub const LAYER: u32 = 14;

pub fn dburi() -> String {
    String::new()
}
pub fn sendstats() -> bool {
    true
}
pub fn checkupdates() -> bool {
    true
}

pub fn telegram_ttl() -> i64 {
    300
}
pub fn telegram_prefix() -> String {
    "<".to_string()
}
pub fn telegram_postfix() -> String {
    ">".to_string()
}
pub fn allowbots() -> bool {
    true
}
pub fn allowinvites() -> bool {
    false
}
pub fn telegram_moderation() -> bool {
    true
}
pub fn downloadmedia() -> bool {
    false
}
pub fn storage() -> String {
    "none".to_string()
}
pub fn readtimeout() -> u64 {
    100
}
pub fn writetimeout() -> u64 {
    20
}
pub fn serverport() -> u16 {
    8080
}
pub fn baseurl() -> String {
    "http://localhost:8080".to_string()
}
pub fn pomf() -> String {
    "https://p.fuwafuwa.moe".to_string()
}
pub fn komfdate() -> String {
    "week".to_string()
}

pub fn irc_server() -> String {
    "irc.rizon.net".to_string()
}
pub fn irc_port() -> u16 {
    6667
}
pub fn irc_ssl() -> bool {
    false
}
pub fn irc_nick() -> String {
    "irchuu".to_string()
}
pub fn irc_sasl() -> bool {
    false
}
pub fn colorize() -> bool {
    true
}
pub fn palette() -> Vec<String> {
    ["1", "2", "3", "4", "5", "6", "9", "10", "11", "12", "13"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
pub fn irc_prefix() -> String {
    "<".to_string()
}
pub fn irc_postfix() -> String {
    ">".to_string()
}
pub fn maxlength() -> usize {
    18
}
pub fn ellipsis() -> String {
    "\u{2026} ".to_string()
}
pub fn flooddelay() -> u64 {
    500
}
pub fn allowstickers() -> bool {
    true
}
pub fn irc_moderation() -> bool {
    true
}
pub fn kickpermission() -> u8 {
    4
}
pub fn namesupdateinterval() -> u64 {
    600
}
pub fn maxhist() -> u32 {
    40
}
pub fn sendnotices() -> bool {
    true
}
pub fn relayjoinsparts() -> bool {
    true
}
pub fn relaymodes() -> bool {
    true
}
pub fn kickrejoin() -> bool {
    true
}
pub fn announcetopic() -> bool {
    true
}
pub fn debug() -> bool {
    false
}
