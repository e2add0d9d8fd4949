//! Bounded worker pool.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use super::{Credentials, Scheduler, triage};
use crate::account::Account;
use crate::error::Result;
use crate::outcome::Report;
use crate::pacing::PacingPolicy;
use crate::probe::{AccountProbe, Verifier};
use crate::report::{ProgressEvent, ReportAggregator};

/// Keeps up to `concurrency` probes in flight.
///
/// Workers pull accounts from a shared queue in input order. Skipped
/// accounts are resolved before any worker starts and never take a slot.
/// A pacing delay holds back only the worker that earned it, and ends early
/// once no accounts are left to take.
#[derive(Debug)]
pub struct Pooled<V> {
    probe: Arc<AccountProbe<V>>,
    pacing: PacingPolicy,
    concurrency: usize,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl<V: Verifier + 'static> Pooled<V> {
    /// Creates the strategy. A `concurrency` of 0 is treated as 1.
    #[must_use]
    pub fn new(probe: AccountProbe<V>, pacing: PacingPolicy, concurrency: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            pacing,
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    /// Streams progress events to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns the pool size.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl<V: Verifier + 'static> Scheduler for Pooled<V> {
    async fn run(&self, accounts: Vec<Account>) -> Result<Report> {
        let aggregator = Arc::new(ReportAggregator::new(
            accounts.len(),
            self.progress.clone(),
        ));

        let mut queue = VecDeque::with_capacity(accounts.len());
        for (index, account) in accounts.into_iter().enumerate() {
            match triage(account) {
                Ok(credentials) => queue.push_back((index, credentials)),
                Err(skipped) => aggregator.record(index, skipped)?,
            }
        }

        // A single probe-able account gets a single worker, which is the
        // sequential path.
        let workers = self.concurrency.min(queue.len());
        tracing::debug!(workers, queued = queue.len(), "starting worker pool");
        let queue = Arc::new(WorkQueue::new(queue));

        let mut set = JoinSet::new();
        for worker in 0..workers {
            let probe = Arc::clone(&self.probe);
            let queue = Arc::clone(&queue);
            let aggregator = Arc::clone(&aggregator);
            let pacing = self.pacing;
            set.spawn(async move { work(worker, &probe, pacing, &queue, &aggregator).await });
        }

        while let Some(joined) = set.join_next().await {
            joined??;
        }

        aggregator.finish()
    }
}

/// Worker loop: take the next account, probe it, record it, and serve any
/// earned pacing delay before taking another.
///
/// The delay is cut short once the queue runs dry, since no dispatch by
/// this worker would follow it.
async fn work<V: Verifier>(
    worker: usize,
    probe: &AccountProbe<V>,
    pacing: PacingPolicy,
    queue: &WorkQueue,
    aggregator: &ReportAggregator,
) -> Result<()> {
    let mut pending: Option<(String, Duration)> = None;

    loop {
        if let Some((paced, delay)) = pending.take() {
            // Created before the check so a pop in between still wakes us.
            let drained = queue.drained.notified();
            tokio::pin!(drained);
            if queue.is_drained() {
                break;
            }
            aggregator.pacing(&paced, delay);
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = &mut drained => {
                    tracing::debug!(worker, "queue drained during pacing, stopping");
                    break;
                }
            }
        }

        let Some((index, (identifier, secret))) = queue.next() else {
            break;
        };

        tracing::debug!(worker, index, identifier = %identifier, "dispatching");
        aggregator.started(index, &identifier);
        let result = probe.probe(&identifier, &secret).await;
        let delay = pacing.next_delay(&result);
        if !delay.is_zero() {
            pending = Some((result.identifier().to_string(), delay));
        }
        aggregator.record(index, result)?;
    }

    Ok(())
}

/// Accounts waiting for a worker, in input order.
struct WorkQueue {
    items: Mutex<VecDeque<(usize, Credentials)>>,
    /// Fired when the last queued account is taken.
    drained: Notify,
}

impl WorkQueue {
    fn new(items: VecDeque<(usize, Credentials)>) -> Self {
        Self {
            items: Mutex::new(items),
            drained: Notify::new(),
        }
    }

    fn next(&self) -> Option<(usize, Credentials)> {
        let (item, now_empty) = {
            let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
            let item = items.pop_front();
            (item, items.is_empty())
        };
        if item.is_some() && now_empty {
            self.drained.notify_waiters();
        }
        item
    }

    fn is_drained(&self) -> bool {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
