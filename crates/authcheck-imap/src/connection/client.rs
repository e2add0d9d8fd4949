//! Type-state IMAP client connection.
//!
//! - `NotAuthenticated`: after the greeting
//! - `Authenticated`: after a successful `LOGIN`
//!
//! Each state only exposes methods that are valid for that state.

use std::marker::PhantomData;

use tokio::io::{AsyncRead, AsyncWrite};

use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseCode, ResponseParser, Status, Untagged};
use crate::{Error, Result};

/// Marker type for the not-authenticated state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Marker type for the authenticated state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// IMAP client connection with type-state.
pub struct Client<S, State> {
    stream: FramedStream<S>,
    tags: TagGenerator,
    capabilities: Vec<String>,
    _state: PhantomData<State>,
}

impl<S, State> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tags", &self.tags)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Tagged completion of a command.
#[derive(Debug)]
struct Completion {
    status: Status,
    code: Option<ResponseCode>,
    text: String,
}

impl Completion {
    fn into_result(self) -> Result<()> {
        match self.status {
            Status::Ok | Status::PreAuth => Ok(()),
            Status::No => Err(Error::No(self.text)),
            Status::Bad => Err(Error::Bad(self.text)),
            Status::Bye => Err(Error::Bye(self.text)),
        }
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Checks if the server advertised a capability (case-insensitive).
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(capability))
    }

    /// Sends a NOOP command.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer OK.
    pub async fn noop(&mut self) -> Result<()> {
        self.execute(&Command::Noop).await?.into_result()
    }

    /// Sends a command and reads responses up to its tagged completion.
    ///
    /// A command carrying literals is sent chunk by chunk, each after the
    /// server's continuation request. Untagged capability data updates the
    /// stored capabilities.
    async fn execute(&mut self, command: &Command) -> Result<Completion> {
        let tag = self.tags.next_tag();
        tracing::debug!(%tag, command = command.name(), "[IMAP] sending");

        let mut chunks = command.serialize(&tag).into_iter().peekable();
        while let Some(chunk) = chunks.next() {
            self.stream.write_command(&chunk).await?;
            if chunks.peek().is_some() {
                // The server may refuse the literal with a tagged completion.
                if let Some(completion) = self.read_until(&tag, true).await? {
                    return Ok(completion);
                }
            }
        }

        self.read_until(&tag, false).await?.ok_or_else(|| {
            Error::Protocol("response stream ended without a completion".to_string())
        })
    }

    /// Reads responses until the completion tagged `tag`, or until a
    /// continuation request when `until_continuation` is set (then `None`).
    ///
    /// An untagged BYE followed by a closed connection yields [`Error::Bye`].
    async fn read_until(
        &mut self,
        tag: &str,
        until_continuation: bool,
    ) -> Result<Option<Completion>> {
        let mut bye: Option<String> = None;
        loop {
            let line = match self.stream.read_response().await {
                Ok(line) => line,
                Err(Error::Io(e)) => return Err(bye.map_or(Error::Io(e), Error::Bye)),
                Err(e) => return Err(e),
            };

            match ResponseParser::parse(&line)? {
                Response::Tagged {
                    tag: got,
                    status,
                    code,
                    text,
                } if got == tag => {
                    if let Some(ResponseCode::Capability(caps)) = &code {
                        self.capabilities.clone_from(caps);
                    }
                    return Ok(Some(Completion { status, code, text }));
                }
                Response::Tagged { tag: got, .. } => {
                    tracing::debug!(expected = %tag, %got, "[IMAP] ignoring stray tagged response");
                }
                Response::Continuation(_) if until_continuation => return Ok(None),
                Response::Untagged(Untagged::Capability(caps)) => self.capabilities = caps,
                Response::Untagged(Untagged::Status {
                    status: Status::Bye,
                    text,
                    ..
                }) => bye = Some(text),
                Response::Untagged(_) | Response::Continuation(_) => {}
            }
        }
    }

    fn transition<Next>(self) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tags: self.tags,
            capabilities: self.capabilities,
            _state: PhantomData,
        }
    }

    /// Sends LOGOUT and closes the connection.
    ///
    /// A server that sends BYE and drops the connection without a tagged
    /// OK still counts as a clean logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects LOGOUT or the transport fails.
    pub async fn logout(mut self) -> Result<()> {
        match self.execute(&Command::Logout).await {
            Ok(completion) => completion.into_result()?,
            Err(Error::Bye(_)) => {}
            Err(e) => return Err(e),
        }
        // The peer may already have closed its side.
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new client from a connected stream and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is BYE, PREAUTH (no credentials
    /// would be checked), or not a status response at all.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);
        let greeting = framed.read_response().await?;

        let capabilities = match ResponseParser::parse(&greeting)? {
            Response::Untagged(Untagged::Status {
                status: Status::Ok,
                code,
                ..
            }) => match code {
                Some(ResponseCode::Capability(caps)) => caps,
                _ => Vec::new(),
            },
            Response::Untagged(Untagged::Status {
                status: Status::Bye,
                text,
                ..
            }) => return Err(Error::Bye(text)),
            Response::Untagged(Untagged::Status {
                status: Status::PreAuth,
                ..
            }) => {
                return Err(Error::Protocol(
                    "server pre-authenticated the session".to_string(),
                ));
            }
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        };

        Ok(Self {
            stream: framed,
            tags: TagGenerator::default(),
            capabilities,
            _state: PhantomData,
        })
    }

    /// Returns true if the server advertised `LOGINDISABLED`.
    #[must_use]
    pub fn login_disabled(&self) -> bool {
        self.has_capability("LOGINDISABLED")
    }

    /// Authenticates with LOGIN.
    ///
    /// Consumes self and returns an authenticated client on success. A NO
    /// completion is reported as [`Error::Auth`].
    ///
    /// # Errors
    ///
    /// Returns an error if LOGIN is disabled, the credentials are rejected,
    /// or the transport fails.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if self.login_disabled() {
            return Err(Error::LoginDisabled);
        }

        let command = Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let completion = self.execute(&command).await?;
        match completion.status {
            Status::Ok => Ok(self.transition()),
            Status::No if completion.code == Some(ResponseCode::Unavailable) => {
                Err(Error::No(completion.text))
            }
            Status::No => Err(Error::Auth(completion.text)),
            _ => completion.into_result().map(|()| self.transition()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const GREETING: &[u8] = b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] Gimap ready\r\n";

    #[tokio::test]
    async fn test_greeting_capabilities() {
        let mock = Builder::new().read(GREETING).build();
        let client = Client::from_stream(mock).await.unwrap();
        assert!(client.has_capability("auth=plain"));
        assert!(!client.login_disabled());
    }

    #[tokio::test]
    async fn test_bye_greeting() {
        let mock = Builder::new().read(b"* BYE too many connections\r\n").build();
        let err = Client::from_stream(mock).await.unwrap_err();
        assert!(matches!(err, Error::Bye(text) if text == "too many connections"));
    }

    #[tokio::test]
    async fn test_login_noop_logout() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN user@example.com secret\r\n")
            .read(b"* CAPABILITY IMAP4rev1 IDLE\r\n")
            .read(b"A0001 OK user@example.com authenticated (Success)\r\n")
            .write(b"A0002 NOOP\r\n")
            .read(b"A0002 OK Success\r\n")
            .write(b"A0003 LOGOUT\r\n")
            .read(b"* BYE LOGOUT Requested\r\n")
            .read(b"A0003 OK 73 good day (Success)\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let mut client = client.login("user@example.com", "secret").await.unwrap();
        assert!(client.has_capability("IDLE"));
        client.noop().await.unwrap();
        client.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_login_rejected_is_auth_error() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN user@example.com wrong\r\n")
            .read(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials (Failure)\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = client.login("user@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Auth(text) if text == "Invalid credentials (Failure)"));
    }

    #[tokio::test]
    async fn test_login_unavailable_is_not_auth_error() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN user@example.com secret\r\n")
            .read(b"A0001 NO [UNAVAILABLE] Try again later\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = client.login("user@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, Error::No(_)));
    }

    #[tokio::test]
    async fn test_login_disabled() {
        let mock = Builder::new()
            .read(b"* OK [CAPABILITY IMAP4rev1 STARTTLS LOGINDISABLED] ready\r\n")
            .build();
        let client = Client::from_stream(mock).await.unwrap();
        let err = client.login("user", "pass").await.unwrap_err();
        assert!(matches!(err, Error::LoginDisabled));
    }

    #[tokio::test]
    async fn test_login_sends_non_ascii_password_as_literal() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN user@example.com {7}\r\n")
            .read(b"+ Ready for literal data\r\n")
            .write("pässwd\r\n".as_bytes())
            .read(b"A0001 OK authenticated\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        client.login("user@example.com", "pässwd").await.unwrap();
    }

    #[tokio::test]
    async fn test_literal_refused_before_continuation() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN user@example.com {7}\r\n")
            .read(b"A0001 BAD literal not allowed here\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let err = client.login("user@example.com", "pässwd").await.unwrap_err();
        assert!(matches!(err, Error::Bad(text) if text == "literal not allowed here"));
    }

    #[tokio::test]
    async fn test_logout_bye_then_close() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0001 LOGIN u p\r\n")
            .read(b"A0001 OK done\r\n")
            .write(b"A0002 LOGOUT\r\n")
            .read(b"* BYE closing\r\n")
            .build();

        let client = Client::from_stream(mock).await.unwrap();
        let client = client.login("u", "p").await.unwrap();
        client.logout().await.unwrap();
    }
}
