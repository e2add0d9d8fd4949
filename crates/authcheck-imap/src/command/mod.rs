//! IMAP command builder.
//!
//! Only the commands a login check sends are modelled.

mod serialize;
mod tag_generator;

pub use tag_generator::TagGenerator;

use serialize::{Chunks, write_astring};

/// IMAP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// NOOP command.
    Noop,
    /// LOGOUT command.
    Logout,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

// Keeps the password out of logs.
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Noop => f.write_str("Noop"),
            Self::Logout => f.write_str("Logout"),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl Command {
    /// Returns the command keyword.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
            Self::Login { .. } => "LOGIN",
        }
    }

    /// Serializes the command with the given tag.
    ///
    /// Arguments that need a synchronizing literal split the command: every
    /// chunk but the last ends in a `{n}` announcement and must wait for a
    /// continuation request before the next chunk is sent.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<Vec<u8>> {
        let mut chunks = Chunks::default();
        chunks.push(tag.as_bytes());
        chunks.push(b" ");
        chunks.push(self.name().as_bytes());

        if let Self::Login { username, password } = self {
            chunks.push(b" ");
            write_astring(&mut chunks, username);
            chunks.push(b" ");
            write_astring(&mut chunks, password);
        }

        chunks.push(b"\r\n");
        chunks.finish()
    }
}
