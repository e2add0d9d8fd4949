//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TCP connection could not be established.
    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    /// TLS negotiation failed.
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] io::Error),

    /// I/O error on an established session.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server rejected the credentials.
    #[error("authentication rejected ({code}): {message}")]
    Auth {
        /// Reply code (e.g., 535).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Server returned an error reply outside authentication.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 421).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Protocol error (unexpected or malformed response).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Feature not supported by server.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Returns true if the error happened while connecting or during the
    /// TLS handshake.
    #[must_use]
    pub const fn is_connect_stage(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Handshake(_))
    }
}
