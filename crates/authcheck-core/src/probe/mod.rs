//! Per-account probe.
//!
//! [`AccountProbe`] runs the IMAP attempt to completion, pauses, then runs
//! the SMTP attempt. Each attempt has its own timeout clock, and a timeout
//! only ends that attempt.

mod network;

pub use network::NetworkVerifier;

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use tokio::time::Instant;

use crate::config::RunConfig;
use crate::outcome::{AccountResult, ProbeError, Protocol, ProtocolOutcome};

/// Performs the two login handshakes.
///
/// [`NetworkVerifier`] talks to real servers; tests substitute a scripted
/// implementation.
pub trait Verifier: Send + Sync {
    /// Logs in over IMAP and closes the session.
    fn verify_imap(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> impl Future<Output = Result<(), ProbeError>> + Send;

    /// Authenticates over SMTP submission and closes the session.
    fn verify_smtp(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// Probes one account over both protocols.
#[derive(Debug)]
pub struct AccountProbe<V> {
    verifier: V,
    timeout: Duration,
    inter_protocol_pause: Duration,
}

impl<V: Verifier> AccountProbe<V> {
    /// Creates a probe with a per-protocol `timeout` and no pause between
    /// protocols.
    #[must_use]
    pub const fn new(verifier: V, timeout: Duration) -> Self {
        Self {
            verifier,
            timeout,
            inter_protocol_pause: Duration::ZERO,
        }
    }

    /// Creates a probe using the run's timeout and inter-protocol pause.
    #[must_use]
    pub const fn from_config(verifier: V, config: &RunConfig) -> Self {
        Self {
            verifier,
            timeout: config.timeout,
            inter_protocol_pause: config.inter_protocol_pause,
        }
    }

    /// Sets the pause between the IMAP and SMTP attempts.
    #[must_use]
    pub const fn with_inter_protocol_pause(mut self, pause: Duration) -> Self {
        self.inter_protocol_pause = pause;
        self
    }

    /// Probes one account. Skipped accounts never get here; schedulers
    /// report them directly.
    pub async fn probe(&self, identifier: &str, secret: &SecretString) -> AccountResult {
        let started = Instant::now();
        let imap = self.attempt(Protocol::Imap, identifier, secret).await;
        if !self.inter_protocol_pause.is_zero() {
            tokio::time::sleep(self.inter_protocol_pause).await;
        }
        let smtp = self.attempt(Protocol::Smtp, identifier, secret).await;

        AccountResult::probed(identifier, imap, smtp, started.elapsed())
    }

    async fn attempt(
        &self,
        protocol: Protocol,
        identifier: &str,
        secret: &SecretString,
    ) -> ProtocolOutcome {
        let result = match protocol {
            Protocol::Imap => {
                tokio::time::timeout(self.timeout, self.verifier.verify_imap(identifier, secret))
                    .await
            }
            Protocol::Smtp => {
                tokio::time::timeout(self.timeout, self.verifier.verify_smtp(identifier, secret))
                    .await
            }
        }
        .unwrap_or(Err(ProbeError::Timeout));

        match &result {
            Ok(()) => tracing::debug!(identifier, %protocol, "login verified"),
            Err(error) => tracing::warn!(identifier, %protocol, %error, "login check failed"),
        }
        result.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts the secret "good"; IMAP hangs forever for "slow".
    #[derive(Default)]
    struct Scripted {
        calls: AtomicUsize,
    }

    impl Verifier for Scripted {
        async fn verify_imap(&self, _id: &str, secret: &SecretString) -> Result<(), ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match secret.expose_secret().as_str() {
                "good" => Ok(()),
                "slow" => std::future::pending().await,
                _ => Err(ProbeError::Auth("Invalid credentials".into())),
            }
        }

        async fn verify_smtp(&self, _id: &str, secret: &SecretString) -> Result<(), ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            match secret.expose_secret().as_str() {
                "good" | "slow" => Ok(()),
                _ => Err(ProbeError::Auth("535 rejected".into())),
            }
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_protocols_succeed() {
        let probe = AccountProbe::new(Scripted::default(), Duration::from_secs(20))
            .with_inter_protocol_pause(Duration::from_millis(500));
        let result = probe.probe("a@x.com", &secret("good")).await;

        assert!(result.is_full_success());
        let elapsed = result.elapsed().unwrap();
        assert!(elapsed >= Duration::from_millis(510), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_only_ends_that_protocol() {
        let probe = AccountProbe::new(Scripted::default(), Duration::from_secs(2));
        let result = probe.probe("a@x.com", &secret("slow")).await;

        assert_eq!(
            result.imap(),
            &ProtocolOutcome::Failure {
                message: "timeout".into()
            }
        );
        assert_eq!(result.smtp(), &ProtocolOutcome::Success);
        let elapsed = result.elapsed().unwrap();
        assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_credentials() {
        let probe = AccountProbe::new(Scripted::default(), Duration::from_secs(20));
        let result = probe.probe("c@x.com", &secret("bad")).await;

        assert_eq!(result.imap().status_token(), "FAIL");
        assert_eq!(
            result.smtp().detail(),
            "authentication failed: 535 rejected"
        );
        assert!(result.elapsed().is_some());
        assert_eq!(probe.verifier.calls.load(Ordering::SeqCst), 2);
    }
}
