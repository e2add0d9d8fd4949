//! TLS stream setup for IMAP connections.

use std::sync::{Arc, OnceLock};

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::{Error, Result};

/// An implicit-TLS IMAP connection.
pub type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Returns the process-wide TLS connector trusting the webpki roots.
fn tls_connector() -> TlsConnector {
    static CONNECTOR: OnceLock<TlsConnector> = OnceLock::new();
    CONNECTOR
        .get_or_init(|| {
            let root_store = rustls::RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            };
            let config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            TlsConnector::from(Arc::new(config))
        })
        .clone()
}

/// Connects to a server with TLS from the start (port 993).
///
/// TCP failures are reported as [`Error::Connect`] and TLS negotiation
/// failures as [`Error::Handshake`], so callers can tell them apart.
///
/// # Errors
///
/// Returns an error if the host name is not a valid DNS name, the TCP
/// connection fails, or the TLS handshake fails.
pub async fn connect_tls(host: &str, port: u16) -> Result<TlsStream> {
    let server_name = ServerName::try_from(host.to_string())?;

    tracing::debug!(host, port, "[IMAP] connecting");
    let tcp = TcpStream::connect((host, port))
        .await
        .map_err(Error::Connect)?;

    tracing::debug!(host, "[IMAP] TLS handshake");
    tls_connector()
        .connect(server_name, tcp)
        .await
        .map_err(Error::Handshake)
}
