//! One account at a time.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use super::{Scheduler, triage};
use crate::account::Account;
use crate::error::Result;
use crate::outcome::Report;
use crate::pacing::PacingPolicy;
use crate::probe::{AccountProbe, Verifier};
use crate::report::{ProgressEvent, ReportAggregator};

/// Probes accounts strictly in input order.
///
/// A pacing delay earned by one account is served right before the next
/// probe is dispatched, so nothing waits after the last probe and skipped
/// accounts in between are reported without delay.
#[derive(Debug)]
pub struct Sequential<V> {
    probe: AccountProbe<V>,
    pacing: PacingPolicy,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl<V: Verifier> Sequential<V> {
    /// Creates the strategy.
    #[must_use]
    pub const fn new(probe: AccountProbe<V>, pacing: PacingPolicy) -> Self {
        Self {
            probe,
            pacing,
            progress: None,
        }
    }

    /// Streams progress events to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl<V: Verifier> Scheduler for Sequential<V> {
    async fn run(&self, accounts: Vec<Account>) -> Result<Report> {
        let aggregator = ReportAggregator::new(accounts.len(), self.progress.clone());
        let mut pending: Option<(String, Duration)> = None;

        for (index, account) in accounts.into_iter().enumerate() {
            let (identifier, secret) = match triage(account) {
                Ok(credentials) => credentials,
                Err(skipped) => {
                    aggregator.record(index, skipped)?;
                    continue;
                }
            };

            if let Some((paced, delay)) = pending.take() {
                aggregator.pacing(&paced, delay);
                tokio::time::sleep(delay).await;
            }

            aggregator.started(index, &identifier);
            let result = self.probe.probe(&identifier, &secret).await;
            let delay = self.pacing.next_delay(&result);
            if !delay.is_zero() {
                pending = Some((result.identifier().to_string(), delay));
            }
            aggregator.record(index, result)?;
        }

        aggregator.finish()
    }
}
