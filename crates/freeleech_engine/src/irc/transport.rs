use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use super::IrcError;

/// Byte stream the client talks over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + Sync {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + Sync> Transport for T {}

pub type BoxedTransport = Box<dyn Transport>;

/// Opens a fresh transport for each connection attempt.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<BoxedTransport, IrcError>;

    /// Human-readable endpoint for log lines.
    fn endpoint(&self) -> String;
}

/// TCP connector, optionally wrapped in TLS verified against the webpki roots.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    server: String,
    port: u16,
    use_tls: bool,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(server: impl Into<String>, port: u16, use_tls: bool, connect_timeout: Duration) -> Self {
        Self {
            server: server.into(),
            port,
            use_tls,
            connect_timeout,
        }
    }

    /// Pinned to the ring provider so the process-wide default does not matter.
    fn tls_connector() -> Result<TlsConnector, IrcError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|err| IrcError::Tls(err.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(TlsConnector::from(Arc::new(config)))
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<BoxedTransport, IrcError> {
        let tcp = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((self.server.as_str(), self.port)),
        )
        .await
        .map_err(|_| IrcError::ConnectTimeout(self.connect_timeout))??;
        tcp.set_nodelay(true)?;

        if !self.use_tls {
            return Ok(Box::new(tcp));
        }

        let server_name = ServerName::try_from(self.server.clone())
            .map_err(|_| IrcError::InvalidServerName(self.server.clone()))?;
        let tls = tokio::time::timeout(
            self.connect_timeout,
            Self::tls_connector()?.connect(server_name, tcp),
        )
        .await
        .map_err(|_| IrcError::ConnectTimeout(self.connect_timeout))??;
        Ok(Box::new(tls))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}
