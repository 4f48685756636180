//! Byte-stream transport to the chat server.
//!
//! [`TransportStream`] is the stream [`Session::connect`](crate::Session::connect)
//! opens: plain TCP, or TCP wrapped in rustls when [`ServerConfig::tls`] is
//! set. Sessions also accept any other `AsyncRead + AsyncWrite` stream
//! through [`Session::attach`](crate::Session::attach).

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::SessionError;

/// An established connection.
#[derive(Debug)]
pub enum TransportStream {
    Tcp(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl TransportStream {
    /// Open a connection to `server`.
    pub async fn connect(server: &ServerConfig) -> Result<Self, SessionError> {
        let stream = TcpStream::connect((server.host.as_str(), server.port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        debug!(host = %server.host, port = server.port, tls = server.tls, "tcp connected");

        if server.tls {
            Self::wrap_tls(stream, &server.host).await
        } else {
            Ok(Self::Tcp(stream))
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    #[cfg(feature = "tls")]
    async fn wrap_tls(stream: TcpStream, host: &str) -> Result<Self, SessionError> {
        use std::sync::Arc;
        use tokio_rustls::rustls::{self, pki_types::ServerName};
        use tokio_rustls::TlsConnector;

        let root_store =
            rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| SessionError::Tls(format!("invalid server name {:?}: {}", host, e)))?;
        let tls = TlsConnector::from(Arc::new(config))
            .connect(server_name, stream)
            .await
            .map_err(|e| SessionError::Tls(format!("handshake with {} failed: {}", host, e)))?;
        debug!(host, "tls established");

        Ok(Self::Tls(Box::new(tls)))
    }

    #[cfg(not(feature = "tls"))]
    async fn wrap_tls(_stream: TcpStream, _host: &str) -> Result<Self, SessionError> {
        Err(SessionError::Tls(
            "built without the `tls` feature".to_string(),
        ))
    }

    pub fn is_tls(&self) -> bool {
        match self {
            Self::Tcp(_) => false,
            #[cfg(feature = "tls")]
            Self::Tls(_) => true,
        }
    }
}

impl AsyncRead for TransportStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(feature = "tls")]
            Self::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for TransportStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(feature = "tls")]
            Self::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_flush(cx),
            #[cfg(feature = "tls")]
            Self::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(feature = "tls")]
            Self::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
