//! Probe outcomes and the final report.

use std::fmt;
use std::time::Duration;

/// The two verified protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Mail retrieval login.
    Imap,
    /// Mail submission login.
    Smtp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Imap => "IMAP",
            Self::Smtp => "SMTP",
        })
    }
}

/// Why a protocol attempt failed.
///
/// Rendered with `Display` this is the short text stored in
/// [`ProtocolOutcome::Failure`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The endpoint could not be reached, or the transport dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// TLS negotiation failed.
    #[error("TLS handshake failed: {0}")]
    Handshake(String),

    /// The server rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The attempt did not finish within the timeout.
    #[error("timeout")]
    Timeout,

    /// The server answered with something unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Both the implicit-TLS and the STARTTLS submission paths failed.
    #[error("implicit TLS: {primary}; STARTTLS: {fallback}")]
    Fallback {
        /// Failure on the implicit-TLS port.
        primary: Box<ProbeError>,
        /// Failure on the STARTTLS port.
        fallback: Box<ProbeError>,
    },
}

impl From<authcheck_imap::Error> for ProbeError {
    fn from(err: authcheck_imap::Error) -> Self {
        use authcheck_imap::Error;
        match err {
            Error::Connect(e) | Error::Io(e) => Self::Connection(e.to_string()),
            Error::InvalidDnsName(e) => Self::Connection(e.to_string()),
            Error::Handshake(e) => Self::Handshake(e.to_string()),
            Error::Auth(text) => Self::Auth(text),
            Error::LoginDisabled => Self::Auth("LOGIN disabled by server".to_string()),
            Error::Protocol(message) => Self::Protocol(message),
            other @ (Error::Parse { .. } | Error::No(_) | Error::Bad(_) | Error::Bye(_)) => {
                Self::Protocol(other.to_string())
            }
        }
    }
}

impl From<authcheck_smtp::Error> for ProbeError {
    fn from(err: authcheck_smtp::Error) -> Self {
        use authcheck_smtp::Error;
        match err {
            Error::Connect(e) | Error::Io(e) => Self::Connection(e.to_string()),
            Error::Handshake(e) => Self::Handshake(e.to_string()),
            Error::Auth { code, message } => Self::Auth(format!("{code} {message}")),
            Error::SmtpError { code, message } => Self::Protocol(format!("{code} {message}")),
            Error::Protocol(message) => Self::Protocol(message),
            other @ Error::NotSupported(_) => Self::Protocol(other.to_string()),
        }
    }
}

/// Outcome of one protocol for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolOutcome {
    /// Login succeeded and the session was closed.
    Success,
    /// The attempt failed.
    Failure {
        /// Short classification of the failure.
        message: String,
    },
    /// The attempt was never made.
    Skipped {
        /// Why it was not attempted.
        reason: String,
    },
}

impl ProtocolOutcome {
    /// Returns the report token: `OK`, `FAIL` or `SKIP`.
    #[must_use]
    pub const fn status_token(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Failure { .. } => "FAIL",
            Self::Skipped { .. } => "SKIP",
        }
    }

    /// Returns the failure message or skip reason; empty on success.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Success => "",
            Self::Failure { message } => message,
            Self::Skipped { reason } => reason,
        }
    }

    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Result<(), ProbeError>> for ProtocolOutcome {
    fn from(result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => Self::Failure {
                message: err.to_string(),
            },
        }
    }
}

/// Result for one account: both protocol outcomes and the elapsed time.
///
/// `elapsed` is present exactly when at least one protocol was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountResult {
    identifier: String,
    imap: ProtocolOutcome,
    smtp: ProtocolOutcome,
    elapsed: Option<Duration>,
}

impl AccountResult {
    /// Creates the result of a probe that attempted both protocols.
    #[must_use]
    pub fn probed(
        identifier: impl Into<String>,
        imap: ProtocolOutcome,
        smtp: ProtocolOutcome,
        elapsed: Duration,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            imap,
            smtp,
            elapsed: Some(elapsed),
        }
    }

    /// Creates the result of an account that was never probed.
    #[must_use]
    pub fn skipped(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            identifier: identifier.into(),
            imap: ProtocolOutcome::Skipped {
                reason: reason.clone(),
            },
            smtp: ProtocolOutcome::Skipped { reason },
            elapsed: None,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the IMAP outcome.
    #[must_use]
    pub const fn imap(&self) -> &ProtocolOutcome {
        &self.imap
    }

    /// Returns the SMTP outcome.
    #[must_use]
    pub const fn smtp(&self) -> &ProtocolOutcome {
        &self.smtp
    }

    /// Returns the wall-clock time of the probe, absent when skipped.
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Returns the elapsed time in seconds, absent when skipped.
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed.map(|d| d.as_secs_f64())
    }

    /// Returns true if both protocols succeeded.
    #[must_use]
    pub const fn is_full_success(&self) -> bool {
        self.imap.is_success() && self.smtp.is_success()
    }

    /// Returns true if the account was never probed.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.elapsed.is_none()
    }
}

/// Counts over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Rows in the report.
    pub total: usize,
    /// Rows where both protocols succeeded.
    pub succeeded: usize,
    /// Probed rows with at least one failure.
    pub failed: usize,
    /// Rows never probed.
    pub skipped: usize,
}

/// Results in the same order as the input accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    results: Vec<AccountResult>,
}

impl Report {
    /// Creates a report from results already in input order.
    #[must_use]
    pub const fn new(results: Vec<AccountResult>) -> Self {
        Self { results }
    }

    /// Returns the rows.
    #[must_use]
    pub fn results(&self) -> &[AccountResult] {
        &self.results
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if the report has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the rows in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, AccountResult> {
        self.results.iter()
    }

    /// Counts successes, failures and skips.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.results.iter().fold(
            Summary {
                total: self.results.len(),
                ..Summary::default()
            },
            |mut summary, result| {
                if result.is_skipped() {
                    summary.skipped += 1;
                } else if result.is_full_success() {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            },
        )
    }
}

impl IntoIterator for Report {
    type Item = AccountResult;
    type IntoIter = std::vec::IntoIter<AccountResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a AccountResult;
    type IntoIter = std::slice::Iter<'a, AccountResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_timeout_message_is_exact() {
        let outcome = ProtocolOutcome::from(Err(ProbeError::Timeout));
        assert_eq!(outcome.detail(), "timeout");
        assert_eq!(outcome.status_token(), "FAIL");
    }

    #[test]
    fn test_imap_error_classification() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            ProbeError::from(authcheck_imap::Error::Connect(refused)),
            ProbeError::Connection(_)
        ));
        let auth = ProbeError::from(authcheck_imap::Error::Auth("Invalid credentials".into()));
        assert_eq!(auth.to_string(), "authentication failed: Invalid credentials");
        assert!(matches!(auth, ProbeError::Auth(_)));
        assert!(matches!(
            ProbeError::from(authcheck_imap::Error::Bye("busy".into())),
            ProbeError::Protocol(_)
        ));
    }

    #[test]
    fn test_smtp_error_classification() {
        let rejected = ProbeError::from(authcheck_smtp::Error::Auth {
            code: 535,
            message: "5.7.8 Username and Password not accepted.".into(),
        });
        assert_eq!(
            rejected.to_string(),
            "authentication failed: 535 5.7.8 Username and Password not accepted."
        );
        let tls = io::Error::new(io::ErrorKind::InvalidData, "corrupt message");
        assert!(matches!(
            ProbeError::from(authcheck_smtp::Error::Handshake(tls)),
            ProbeError::Handshake(_)
        ));
    }

    #[test]
    fn test_fallback_message_names_both_paths() {
        let err = ProbeError::Fallback {
            primary: Box::new(ProbeError::Connection("refused".into())),
            fallback: Box::new(ProbeError::Auth("535 bad".into())),
        };
        assert_eq!(
            err.to_string(),
            "implicit TLS: connection failed: refused; STARTTLS: authentication failed: 535 bad"
        );
    }

    #[test]
    fn test_skipped_result_has_no_elapsed() {
        let result = AccountResult::skipped("b@x.com", "missing secret");
        assert!(result.is_skipped());
        assert_eq!(result.elapsed_seconds(), None);
        assert_eq!(result.imap().status_token(), "SKIP");
        assert_eq!(result.smtp().detail(), "missing secret");
        assert!(!result.is_full_success());
    }

    #[test]
    fn test_summary() {
        let report = Report::new(vec![
            AccountResult::probed(
                "a",
                ProtocolOutcome::Success,
                ProtocolOutcome::Success,
                Duration::from_millis(800),
            ),
            AccountResult::skipped("b", "missing secret"),
            AccountResult::probed(
                "c",
                ProtocolOutcome::Success,
                ProtocolOutcome::from(Err(ProbeError::Timeout)),
                Duration::from_secs(20),
            ),
        ]);
        assert_eq!(
            report.summary(),
            Summary {
                total: 3,
                succeeded: 1,
                failed: 1,
                skipped: 1,
            }
        );
    }
}
