//! Verifier backed by real IMAP and SMTP sessions.

use secrecy::{ExposeSecret, SecretString};

use super::Verifier;
use crate::config::Endpoints;
use crate::outcome::ProbeError;

/// Name sent in `EHLO`.
const CLIENT_HOSTNAME: &str = "localhost";

/// Logs in against the configured servers over TLS.
#[derive(Debug, Clone, Default)]
pub struct NetworkVerifier {
    endpoints: Endpoints,
}

impl NetworkVerifier {
    /// Creates a verifier for `endpoints`.
    #[must_use]
    pub const fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    async fn smtp_implicit_tls(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> authcheck_smtp::Result<()> {
        let Endpoints {
            smtp_host: host,
            smtp_port: port,
            ..
        } = &self.endpoints;
        tracing::debug!(identifier, %host, port, "[SMTP] connecting with implicit TLS");
        let stream = authcheck_smtp::connection::connect_tls(host, *port).await?;
        let client = authcheck_smtp::Client::from_stream(stream)
            .await?
            .ehlo(CLIENT_HOSTNAME)
            .await?;

        tracing::debug!(identifier, "[SMTP] connected (implicit TLS), authenticating");
        let client = client
            .authenticate(identifier, secret.expose_secret())
            .await?;
        if let Err(error) = client.quit().await {
            tracing::debug!(identifier, %error, "[SMTP] QUIT failed after successful AUTH");
        }
        Ok(())
    }

    async fn smtp_starttls(
        &self,
        identifier: &str,
        secret: &SecretString,
        port: u16,
    ) -> authcheck_smtp::Result<()> {
        let host = &self.endpoints.smtp_host;
        tracing::debug!(identifier, %host, port, "[SMTP] connecting for STARTTLS");
        let stream = authcheck_smtp::connection::connect(host, port).await?;
        let client = authcheck_smtp::Client::from_stream(stream)
            .await?
            .ehlo(CLIENT_HOSTNAME)
            .await?
            .starttls(host, CLIENT_HOSTNAME)
            .await?;

        tracing::debug!(identifier, "[SMTP] connected (STARTTLS), authenticating");
        let client = client
            .authenticate(identifier, secret.expose_secret())
            .await?;
        if let Err(error) = client.quit().await {
            tracing::debug!(identifier, %error, "[SMTP] QUIT failed after successful AUTH");
        }
        Ok(())
    }
}

/// Whether an implicit-TLS failure happened before the credentials could
/// be judged, so the STARTTLS port deserves a try.
fn warrants_fallback(error: &authcheck_smtp::Error) -> bool {
    error.is_connect_stage() || matches!(error, authcheck_smtp::Error::Io(_))
}

impl Verifier for NetworkVerifier {
    async fn verify_imap(&self, identifier: &str, secret: &SecretString) -> Result<(), ProbeError> {
        let Endpoints {
            imap_host: host,
            imap_port: port,
            ..
        } = &self.endpoints;
        tracing::debug!(identifier, %host, port, "[IMAP] connecting");
        let stream = authcheck_imap::connect_tls(host, *port).await?;
        let client = authcheck_imap::Client::from_stream(stream).await?;

        tracing::debug!(identifier, "[IMAP] connected, logging in");
        let mut client = client.login(identifier, secret.expose_secret()).await?;

        tracing::debug!(identifier, "[IMAP] logged in, NOOP");
        client.noop().await?;
        if let Err(error) = client.logout().await {
            tracing::debug!(identifier, %error, "[IMAP] LOGOUT failed after successful LOGIN");
        }
        Ok(())
    }

    async fn verify_smtp(&self, identifier: &str, secret: &SecretString) -> Result<(), ProbeError> {
        let primary = match self.smtp_implicit_tls(identifier, secret).await {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };

        let Some(port) = self
            .endpoints
            .smtp_starttls_port
            .filter(|_| warrants_fallback(&primary))
        else {
            return Err(primary.into());
        };

        tracing::debug!(identifier, error = %primary, port, "[SMTP] implicit TLS failed, trying STARTTLS");
        self.smtp_starttls(identifier, secret, port)
            .await
            .map_err(|fallback| ProbeError::Fallback {
                primary: Box::new(primary.into()),
                fallback: Box::new(fallback.into()),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn secret() -> SecretString {
        SecretString::new("abcd efgh ijkl mnop".to_string())
    }

    fn local(smtp_starttls_port: Option<u16>) -> NetworkVerifier {
        NetworkVerifier::new(Endpoints {
            imap_host: "127.0.0.1".to_string(),
            imap_port: closed_port(),
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: closed_port(),
            smtp_starttls_port,
        })
    }

    #[tokio::test]
    async fn test_imap_unreachable_is_connection_error() {
        let err = local(None)
            .verify_imap("a@x.com", &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_smtp_without_fallback_reports_primary_error() {
        let err = local(None)
            .verify_smtp("a@x.com", &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_smtp_fallback_names_both_failures() {
        let err = local(Some(closed_port()))
            .verify_smtp("a@x.com", &secret())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("implicit TLS: connection failed"), "{message}");
        assert!(message.contains("; STARTTLS: connection failed"), "{message}");
    }

    #[tokio::test]
    async fn test_smtp_fallback_without_starttls_support() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            write.write_all(b"220 mx.example.com ESMTP\r\n").await.unwrap();
            let ehlo = lines.next_line().await.unwrap().unwrap();
            assert_eq!(ehlo, "EHLO localhost");
            write
                .write_all(b"250-mx.example.com\r\n250 AUTH PLAIN LOGIN\r\n")
                .await
                .unwrap();
        });

        let err = local(Some(port))
            .verify_smtp("a@x.com", &secret())
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ProbeError::Fallback { fallback, .. }
                if matches!(**fallback, ProbeError::Protocol(_))),
            "got {err:?}"
        );
        assert!(err.to_string().ends_with("STARTTLS: protocol error: Server does not support STARTTLS"));
    }
}
