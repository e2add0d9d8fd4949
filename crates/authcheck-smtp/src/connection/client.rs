//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::marker::PhantomData;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Longest reply line accepted from the server.
const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<S, State> {
    stream: BufReader<S>,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S, State> Client<S, State> {
    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn transition<Next>(self) -> Client<S, Next> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }
}

impl<S> Client<S, Connected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut stream = BufReader::new(stream);
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::smtp_error(
                greeting.code.as_u16(),
                greeting.message_text(),
            ));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: std::collections::HashSet::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .send_command(&Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        // The first line is the server's greeting text, not an extension.
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(self)
    }

    /// Authenticates with the best password mechanism the server offers
    /// (PLAIN, else LOGIN). EHLO must have been sent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if neither mechanism is offered,
    /// [`Error::Auth`] if the credentials are rejected, or another error if
    /// the exchange fails.
    pub async fn authenticate(
        self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        match self.server_info.password_mechanism() {
            Some(AuthMechanism::Plain) => self.auth_plain(username, password).await,
            Some(AuthMechanism::Login) => self.auth_login(username, password).await,
            _ if self.server_info.auth_mechanisms().is_none() => {
                Err(Error::NotSupported("AUTH".into()))
            }
            _ => Err(Error::NotSupported("AUTH PLAIN or LOGIN".into())),
        }
    }

    /// Authenticates using PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        let credentials = format!("\0{username}\0{password}");
        let reply = self
            .send_command(&Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(BASE64.encode(credentials.as_bytes())),
            })
            .await?;

        check_auth_reply(&reply)?;
        Ok(self.transition())
    }

    /// Authenticates using the two-step LOGIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        let mut reply = self
            .send_command(&Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            })
            .await?;

        for value in [username, password] {
            if reply.code != ReplyCode::AUTH_CONTINUE {
                break;
            }
            reply = self
                .send_command(&Command::SaslResponse(BASE64.encode(value.as_bytes())))
                .await?;
        }

        check_auth_reply(&reply)?;
        Ok(self.transition())
    }
}

impl Client<SmtpStream, Connected> {
    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.send_command(&Command::StartTls).await?;
        if reply.code != ReplyCode::SERVICE_READY {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        // Anything buffered past the 220 arrived in plaintext and must not
        // be treated as part of the encrypted session.
        if !self.stream.buffer().is_empty() {
            return Err(Error::Protocol(
                "server sent data after STARTTLS response".into(),
            ));
        }

        let upgraded = self
            .stream
            .into_inner()
            .upgrade_to_tls(hostname)
            .await?;
        let client = Self {
            stream: BufReader::new(upgraded),
            server_info: ServerInfo {
                hostname: self.server_info.hostname,
                extensions: std::collections::HashSet::new(),
            },
            _state: PhantomData,
        };
        client.ehlo(client_hostname).await
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        tracing::debug!(command = ?cmd, "[SMTP] sending");
        let stream = self.stream.get_mut();
        stream.write_all(&cmd.serialize()).await?;
        stream.flush().await?;
        read_reply(&mut self.stream).await
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(&Command::Quit).await?;
        if !reply.is_success() {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        // The server closes after 221; a failed shutdown changes nothing.
        let _ = self.stream.get_mut().shutdown().await;
        Ok(())
    }
}

/// Maps the final reply of an AUTH exchange.
fn check_auth_reply(reply: &Reply) -> Result<()> {
    if reply.is_success() {
        Ok(())
    } else if reply.code.rejects_credentials() {
        Err(Error::Auth {
            code: reply.code.as_u16(),
            message: reply.message_text(),
        })
    } else {
        Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()))
    }
}

async fn read_reply<S>(stream: &mut BufReader<S>) -> Result<Reply>
where
    S: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let line = read_line(stream).await?;
        if line.is_empty() {
            continue;
        }
        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }
    parse_reply(&lines)
}

async fn read_line<S>(stream: &mut BufReader<S>) -> Result<String>
where
    S: AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut raw = Vec::new();
    let read = stream
        .take(MAX_LINE_LENGTH as u64)
        .read_until(b'\n', &mut raw)
        .await?;
    if read == 0 {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed",
        )));
    }
    if !raw.ends_with(b"\n") && read >= MAX_LINE_LENGTH {
        return Err(Error::Protocol("reply line too long".into()));
    }
    Ok(String::from_utf8_lossy(&raw).trim_end().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const GREETING: &[u8] = b"220 smtp.gmail.com ESMTP ready\r\n";
    const EHLO_REPLY: &[u8] = b"250-smtp.gmail.com at your service\r\n\
                                250-SIZE 35882577\r\n\
                                250-AUTH LOGIN PLAIN XOAUTH2\r\n\
                                250 SMTPUTF8\r\n";

    #[tokio::test]
    async fn test_greeting_and_ehlo() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(EHLO_REPLY)
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        assert_eq!(client.server_info().hostname, "smtp.gmail.com");
        let client = client.ehlo("localhost").await.unwrap();
        assert_eq!(
            client.server_info().password_mechanism(),
            Some(AuthMechanism::Plain)
        );
    }

    #[tokio::test]
    async fn test_auth_plain_success_then_quit() {
        // base64("\0user@example.com\0secret")
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AHVzZXJAZXhhbXBsZS5jb20Ac2VjcmV0\r\n")
            .read(b"235 2.7.0 Accepted\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 2.0.0 closing connection\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();
        let client = client
            .authenticate("user@example.com", "secret")
            .await
            .unwrap();
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_rejected() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AHVzZXJAZXhhbXBsZS5jb20Ad3Jvbmc=\r\n")
            .read(b"535-5.7.8 Username and Password not accepted.\r\n")
            .read(b"535 5.7.8 https://support.google.com/mail/?p=BadCredentials\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();
        let err = client
            .authenticate("user@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth { code: 535, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_auth_login_flow() {
        // "user" -> dXNlcg==, "pass" -> cGFzcw==
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(b"250-mail.example.com\r\n250 AUTH LOGIN\r\n")
            .write(b"AUTH LOGIN\r\n")
            .read(b"334 VXNlcm5hbWU6\r\n")
            .write(b"dXNlcg==\r\n")
            .read(b"334 UGFzc3dvcmQ6\r\n")
            .write(b"cGFzcw==\r\n")
            .read(b"235 Authentication successful\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();
        client.authenticate("user", "pass").await.unwrap();
    }

    #[tokio::test]
    async fn test_temporary_auth_failure_is_not_rejection() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AHUAcA==\r\n")
            .read(b"454 4.7.0 Too many login attempts\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();
        let err = client.authenticate("u", "p").await.unwrap_err();
        assert!(matches!(err, Error::SmtpError { code: 454, .. }));
        assert!(!err.is_connect_stage());
    }

    #[tokio::test]
    async fn test_no_auth_advertised() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"EHLO localhost\r\n")
            .read(b"250-mail.example.com\r\n250 STARTTLS\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.ehlo("localhost").await.unwrap();
        let err = client.authenticate("u", "p").await.unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
    }

    #[tokio::test]
    async fn test_unavailable_greeting() {
        let mock = Builder::new()
            .read(b"421 4.3.2 Service not available\r\n")
            .build();
        let err = Client::from_stream(mock).await.unwrap_err();
        assert!(matches!(err, Error::SmtpError { code: 421, .. }));
    }
}
