//! Delay between accounts.

use std::time::Duration;

use crate::config::RunConfig;
use crate::outcome::AccountResult;

/// Decides how long to wait before dispatching the next account.
///
/// Only a fully successful login is paced: those are the attempts that
/// look like real sign-ins to the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingPolicy {
    delay_on_success: Duration,
}

impl PacingPolicy {
    /// Creates a policy that waits `delay_on_success` after a full success.
    #[must_use]
    pub const fn new(delay_on_success: Duration) -> Self {
        Self { delay_on_success }
    }

    /// Creates the policy configured for a run.
    #[must_use]
    pub const fn from_config(config: &RunConfig) -> Self {
        Self::new(config.delay_on_success)
    }

    /// Returns the delay to apply after `previous` before the next dispatch.
    #[must_use]
    pub const fn next_delay(&self, previous: &AccountResult) -> Duration {
        if previous.is_full_success() {
            self.delay_on_success
        } else {
            Duration::ZERO
        }
    }
}
