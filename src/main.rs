//! irchuu - a bidirectional IRC<->Telegram relay bridge.
//!
//! Wires a [`config::Config`], an optional [`db::Database`], and the two
//! drivers together through a [`relay`] bus, then waits for either driver to
//! exit or a shutdown signal to arrive.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use irchuu_rs::config::{self, Config};
use irchuu_rs::db::Database;
use irchuu_rs::http;
use irchuu_rs::irc::IrcDriver;
use irchuu_rs::relay::{self, ServiceMessage};
use irchuu_rs::telegram::TelegramDriver;
use irchuu_rs::telemetry;

/// CLI flags: `-config <path>` and `-data <path>`, both optional. Falls back
/// to the XDG defaults resolved by [`config::default_config_path`] /
/// [`config::data_dir`].
struct Cli {
    config_path: PathBuf,
    data_dir: PathBuf,
}

fn parse_args() -> Cli {
    let mut config_path = None;
    let mut data_dir = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-config" | "--config" => {
                config_path = args.next().map(PathBuf::from);
            }
            "-data" | "--data" => {
                data_dir = args.next().map(PathBuf::from);
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                std::process::exit(1);
            }
        }
    }

    Cli {
        config_path: config_path.unwrap_or_else(config::default_config_path),
        data_dir: data_dir.unwrap_or_else(config::data_dir),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let cli = parse_args();

    if config::populate_default_config(&cli.config_path, &cli.data_dir)? {
        info!(path = %cli.config_path.display(), "wrote a default configuration, edit it and restart");
        return Ok(());
    }

    let config = Config::load(&cli.config_path.to_string_lossy()).map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;

    info!(version = config::VERSION, layer = config::LAYER, "starting irchuu");

    telemetry::check_and_report(&config.irchuu, &config.irc, &config.telegram).await;

    let history = if config.irchuu.dburi.trim().is_empty() {
        info!("no dburi configured, running without history or kick-by-nick lookup");
        None
    } else {
        match Database::connect(&config.irchuu.dburi).await {
            Ok(db) => Some(Arc::new(db)),
            Err(e) => {
                error!(error = %e, "failed to connect to the database");
                return Err(e.into());
            }
        }
    };

    let data_dir = if config.telegram.data_dir.trim().is_empty() {
        cli.data_dir.clone()
    } else {
        PathBuf::from(&config.telegram.data_dir)
    };
    tokio::fs::create_dir_all(&data_dir).await.ok();

    let (senders, receivers) = relay::new_relay();

    if config.telegram.storage == "server" {
        let media_config = config.telegram.clone();
        let media_dir = data_dir.clone();
        tokio::spawn(async move {
            http::run_media_server(&media_config, media_dir).await;
        });
    }

    let irc_driver = IrcDriver::new(config.irc.clone(), history.clone());
    let telegram_driver = TelegramDriver::new(config.telegram.clone(), history.clone(), data_dir);

    let irc_task = tokio::spawn(irc_driver.run(
        receivers.tele_rx,
        receivers.tele_service_rx,
        senders.irc_tx.clone(),
        senders.irc_service_tx.clone(),
    ));
    let telegram_task = tokio::spawn(telegram_driver.run(
        receivers.irc_rx,
        receivers.irc_service_rx,
        senders.tele_tx.clone(),
        senders.tele_service_tx.clone(),
    ));

    let shutdown_tx = senders.tele_service_tx.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received, telling the IRC side to quit");
        let _ = shutdown_tx.send(ServiceMessage::new("shutdown", Vec::new())).await;
    });

    tokio::select! {
        result = irc_task => {
            match result {
                Ok(Ok(())) => info!("irc driver stopped"),
                Ok(Err(e)) => error!(error = %e, "irc driver exited with an error"),
                Err(e) => error!(error = %e, "irc driver task panicked"),
            }
        }
        result = telegram_task => {
            match result {
                Ok(Ok(())) => info!("telegram driver stopped"),
                Ok(Err(e)) => error!(error = %e, "telegram driver exited with an error"),
                Err(e) => error!(error = %e, "telegram driver task panicked"),
            }
        }
    }

    Ok(())
}

/// Waits for SIGINT/SIGTERM (or a second signal of either, which forces an
/// immediate exit rather than waiting on a graceful drain that isn't coming).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
            _ = sighup.recv() => { warn!("SIGHUP is not supported for rehash, treating as shutdown"); }
        }

        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => {}
                _ = sigterm.recv() => {}
            }
            warn!("second signal received, forcing exit");
            std::process::exit(1);
        });
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
