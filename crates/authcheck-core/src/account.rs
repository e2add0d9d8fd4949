//! Input accounts.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Why an account is reported without being probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No secret was supplied.
    MissingSecret,
    /// Reason supplied by the input adapter.
    Custom(String),
}

impl SkipReason {
    /// Creates an adapter-defined reason.
    #[must_use]
    pub fn custom(reason: impl Into<String>) -> Self {
        Self::Custom(reason.into())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecret => f.write_str("missing secret"),
            Self::Custom(reason) => f.write_str(reason),
        }
    }
}

/// One identifier + secret pair to verify.
///
/// An account whose secret is absent or empty carries a [`SkipReason`] and
/// is never handed to a probe.
#[derive(Debug)]
pub struct Account {
    identifier: String,
    secret: Option<SecretString>,
    skip: Option<SkipReason>,
}

impl Account {
    /// Creates an account. An absent or empty secret marks it skipped.
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: Option<SecretString>) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        let skip = secret.is_none().then_some(SkipReason::MissingSecret);
        Self {
            identifier: identifier.into(),
            secret,
            skip,
        }
    }

    /// Creates an account that is reported as skipped for `reason`.
    #[must_use]
    pub fn skipped(identifier: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            identifier: identifier.into(),
            secret: None,
            skip: Some(reason),
        }
    }

    /// Returns the account identifier (the report key).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the secret, or `None` for a skipped account.
    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        if self.skip.is_some() {
            return None;
        }
        self.secret.as_ref()
    }

    /// Returns why the account is skipped, if it is.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<&SkipReason> {
        self.skip.as_ref()
    }

    /// Returns true if the account will be probed.
    #[must_use]
    pub const fn is_probeable(&self) -> bool {
        self.skip.is_none()
    }

    /// Splits the account into its identifier and either its secret or the
    /// reason it is skipped.
    pub(crate) fn into_parts(self) -> (String, Result<SecretString, SkipReason>) {
        let secret = match (self.skip, self.secret) {
            (None, Some(secret)) => Ok(secret),
            (Some(reason), _) => Err(reason),
            (None, None) => Err(SkipReason::MissingSecret),
        };
        (self.identifier, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Option<SecretString> {
        Some(SecretString::new(s.to_string()))
    }

    #[test]
    fn test_account_with_secret_is_probeable() {
        let account = Account::new("a@x.com", secret("good"));
        assert!(account.is_probeable());
        assert_eq!(account.identifier(), "a@x.com");
        assert_eq!(
            account.secret().map(|s| s.expose_secret().as_str()),
            Some("good")
        );
    }

    #[test]
    fn test_empty_or_absent_secret_is_skipped() {
        for account in [Account::new("b@x.com", secret("")), Account::new("b@x.com", None)] {
            assert!(!account.is_probeable());
            assert!(account.secret().is_none());
            assert_eq!(account.skip_reason(), Some(&SkipReason::MissingSecret));
        }
    }

    #[test]
    fn test_custom_skip_reason() {
        let account = Account::skipped("(row 4)", SkipReason::custom("missing email"));
        assert_eq!(
            account.skip_reason().map(ToString::to_string).as_deref(),
            Some("missing email")
        );
    }

    #[test]
    fn test_into_parts() {
        let (identifier, secret) = Account::new("a@x.com", secret("good")).into_parts();
        assert_eq!(identifier, "a@x.com");
        assert_eq!(secret.map(|s| s.expose_secret().clone()).ok().as_deref(), Some("good"));

        let (_, secret) =
            Account::skipped("(row 4)", SkipReason::custom("missing email")).into_parts();
        assert_eq!(secret.err(), Some(SkipReason::custom("missing email")));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let account = Account::new("a@x.com", secret("hunter2"));
        assert!(!format!("{account:?}").contains("hunter2"));
    }
}
