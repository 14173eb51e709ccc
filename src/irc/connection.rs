//! TCP/TLS dial and registration handshake, grounded in the connect/auth
//! flow `irc/irc.go` delegates to its IRC library and in the teacher's
//! `Framed`-based connection setup.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;

use slirc_proto::IrcCodec;

use crate::config::IrcConfig;
use crate::error::IrcError;

/// Either a plain or a TLS-wrapped TCP stream. Both halves are `Unpin`, so
/// the enum can forward `AsyncRead`/`AsyncWrite` without pinning machinery.
pub enum IrcStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for IrcStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for IrcStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_flush(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Dial `server:port`, optionally upgrading to TLS, and wrap the stream in
/// the line/message codec. Registration (`PASS`/`NICK`/`USER`/`CAP`/SASL)
/// happens one layer up, once the caller has a `Framed` to write through.
pub async fn dial(config: &IrcConfig) -> Result<Framed<IrcStream, IrcCodec>, IrcError> {
    let tcp = TcpStream::connect((config.server.as_str(), config.port))
        .await
        .map_err(|source| IrcError::Connect {
            server: config.server.clone(),
            port: config.port,
            source,
        })?;

    let stream = if config.ssl {
        IrcStream::Tls(Box::new(connect_tls(&config.server, tcp).await?))
    } else {
        IrcStream::Plain(tcp)
    };

    let codec = IrcCodec::with_max_len("utf-8", 512).map_err(|e| IrcError::Tls {
        server: config.server.clone(),
        source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
    })?;

    Ok(Framed::new(stream, codec))
}

async fn connect_tls(server: &str, tcp: TcpStream) -> Result<TlsStream<TcpStream>, IrcError> {
    let to_tls_err = |source: io::Error| IrcError::Tls {
        server: server.to_string(),
        source,
    };

    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for cert in native.certs {
        let _ = roots.add(cert);
    }

    let tls_config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(tls_config));
    let domain = ServerName::try_from(server.to_string())
        .map_err(|e| to_tls_err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string())))?;

    connector
        .connect(domain, tcp)
        .await
        .map_err(to_tls_err)
}
