//! # authcheck-imap
//!
//! A small IMAP client that does exactly what a credential check needs:
//! open an implicit-TLS session, read the greeting, `LOGIN`, `NOOP` and
//! `LOGOUT`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use authcheck_imap::Client;
//! use authcheck_imap::connection::connect_tls;
//!
//! #[tokio::main]
//! async fn main() -> authcheck_imap::Result<()> {
//!     let stream = connect_tls("imap.gmail.com", 993).await?;
//!     let client = Client::from_stream(stream).await?;
//!
//!     let mut client = client.login("user@example.com", "app-password").await?;
//!     client.noop().await?;
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌─────────────────────┐
//! │   NotAuthenticated  │ ─── login() ───→ Authenticated ─── logout()
//! └─────────────────────┘
//! ```
//!
//! Only the methods valid for a state are available on it, so a `NOOP` can
//! never be sent before `LOGIN` has completed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;

pub use command::{Command, TagGenerator};
pub use connection::{Authenticated, Client, FramedStream, NotAuthenticated, connect_tls};
pub use error::{Error, Result};
pub use parser::{Response, ResponseCode, ResponseParser, Status, Untagged};

/// Default port for IMAP over implicit TLS.
pub const IMAPS_PORT: u16 = 993;
