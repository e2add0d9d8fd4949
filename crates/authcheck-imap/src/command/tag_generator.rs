//! IMAP command tag generator.

/// Produces sequential command tags (`A0001`, `A0002`, ...).
///
/// A session only ever issues a handful of commands, so the counter simply
/// wraps instead of failing.
#[derive(Debug, Clone)]
pub struct TagGenerator {
    prefix: char,
    next: u16,
}

impl TagGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self { prefix, next: 1 }
    }

    /// Returns the next tag.
    pub fn next_tag(&mut self) -> String {
        let tag = format!("{}{:04}", self.prefix, self.next);
        self.next = self.next.wrapping_add(1);
        tag
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}
