//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.extensions.contains(&Extension::StartTls)
    }

    /// Returns advertised authentication mechanisms, or `None` if the server
    /// did not advertise AUTH at all.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Option<&[AuthMechanism]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
            _ => None,
        })
    }

    /// Picks the password mechanism to use: PLAIN when offered, else LOGIN.
    #[must_use]
    pub fn password_mechanism(&self) -> Option<AuthMechanism> {
        let offered = self.auth_mechanisms()?;
        [AuthMechanism::Plain, AuthMechanism::Login]
            .into_iter()
            .find(|m| offered.contains(m))
    }
}
