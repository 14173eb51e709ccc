//! HTTP server for media files uploaded by the Telegram side.
//!
//! Serves the data directory at `<baseurl>/<mediaID><ext>` when
//! `[telegram] storage = server`, using TLS if both `certfilepath` and
//! `keyfilepath` are configured. Same `axum` + background-task shape as
//! the Prometheus endpoint this was adapted from, with `tower-http`'s
//! `ServeDir` standing in for a single hand-written route.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tower_http::services::ServeDir;

use crate::config::TelegramConfig;

/// Run the media file server. Blocks forever (or until the listener fails),
/// meant to be spawned as its own background task.
pub async fn run_media_server(config: &TelegramConfig, data_dir: PathBuf) {
    let app = Router::new().nest_service("/", ServeDir::new(data_dir));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));

    let tls = if !config.cert_file_path.is_empty() && !config.key_file_path.is_empty() {
        match RustlsConfig::from_pem_file(&config.cert_file_path, &config.key_file_path).await {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::error!(target: "server", error = %e, "failed to load TLS cert/key, serving plaintext");
                None
            }
        }
    } else {
        None
    };

    tracing::info!(target: "server", %addr, tls = tls.is_some(), "media server listening");

    let result = match tls {
        Some(tls_config) => {
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await
        }
        None => axum_server::bind(addr).serve(app.into_make_service()).await,
    };

    if let Err(e) = result {
        tracing::error!(target: "server", error = %e, "media server error");
    }
}
