//! # authcheck-smtp
//!
//! A small SMTP submission client covering what a credential check needs:
//! implicit TLS (port 465) or STARTTLS (port 587), `EHLO`, `AUTH PLAIN` /
//! `AUTH LOGIN` and `QUIT`. No mail is ever sent.
//!
//! ## Quick Start
//!
//! ```ignore
//! use authcheck_smtp::Client;
//! use authcheck_smtp::connection::connect_tls;
//!
//! #[tokio::main]
//! async fn main() -> authcheck_smtp::Result<()> {
//!     let stream = connect_tls("smtp.gmail.com", 465).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.authenticate("user@example.com", "app-password").await?;
//!     client.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── authenticate() ───→ Authenticated
//! └──────────────┘
//!        │
//!        └─── starttls() ───→ Connected (over TLS)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Authenticated, Client, Connected, ServerInfo, SmtpStream};
pub use error::{Error, Result};
pub use types::{AuthMechanism, Extension, Reply, ReplyCode};

/// Default port for SMTP submission over implicit TLS.
pub const SUBMISSIONS_PORT: u16 = 465;

/// Default port for SMTP submission with STARTTLS.
pub const SUBMISSION_PORT: u16 = 587;
