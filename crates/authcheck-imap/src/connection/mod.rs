//! IMAP connection management.
//!
//! - TLS connection setup
//! - Framed I/O for IMAP responses
//! - Type-state client

mod client;
mod framed;
mod stream;

pub use client::{Authenticated, Client, NotAuthenticated};
pub use framed::FramedStream;
pub use stream::{TlsStream, connect_tls};
