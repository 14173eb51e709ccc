//! First-run config population through to a loaded, validated `Config`,
//! exercising `config::paths`, `config::mod` and `config::validation`
//! together the way `main` does on startup.

use irchuu_rs::config::{self, Config};

#[test]
fn sample_config_loads_and_validates() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("irchuu.conf");
    let data_path = tmp.path().join("data");

    let wrote = config::populate_default_config(&config_path, &data_path).unwrap();
    assert!(wrote, "a fresh sample config should be written on first run");

    let config = Config::load(&config_path.to_string_lossy()).expect("sample config must validate");

    assert_eq!(config.irc.server, "irc.rizon.net");
    assert_eq!(config.irc.channel, "#irchuu");
    assert!(config.irc.colorize);
    assert!(!config.irc.palette.is_empty());
    assert_eq!(config.telegram.group, 7654321);
    assert_eq!(config.telegram.storage, "none");
    assert!(config.irchuu.dburi.is_empty());
}

#[test]
fn second_run_does_not_overwrite_an_edited_config() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("irchuu.conf");
    let data_path = tmp.path().join("data");

    config::populate_default_config(&config_path, &data_path).unwrap();
    let sample = std::fs::read_to_string(&config_path).unwrap();
    let edited = sample.replace("nick = irchuu", "nick = mybridge");
    std::fs::write(&config_path, &edited).unwrap();

    let wrote_again = config::populate_default_config(&config_path, &data_path).unwrap();
    assert!(!wrote_again);

    let config = Config::load(&config_path.to_string_lossy()).unwrap();
    assert_eq!(config.irc.nick, "mybridge");
}

#[test]
fn blank_group_fails_validation() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("irchuu.conf");
    let data_path = tmp.path().join("data");

    config::populate_default_config(&config_path, &data_path).unwrap();
    let sample = std::fs::read_to_string(&config_path).unwrap();
    let broken = sample.replace("group = 7654321", "group = 0");
    std::fs::write(&config_path, &broken).unwrap();

    let err = Config::load(&config_path.to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("group must not be zero"));
}
