//! Result accumulation and live progress.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Error, Result};
use crate::outcome::{AccountResult, Report};

/// One line of live progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A probe was dispatched.
    Started {
        /// Input position.
        index: usize,
        /// Account identifier.
        identifier: String,
    },
    /// An account is fully resolved.
    Finished {
        /// Input position.
        index: usize,
        /// The final result.
        result: AccountResult,
    },
    /// A worker is pausing after a fully successful account.
    Pacing {
        /// Account whose success triggered the pause.
        identifier: String,
        /// Length of the pause.
        delay: Duration,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { identifier, .. } => write!(f, "--> Testing {identifier}"),
            Self::Finished { result, .. } => match result.elapsed_seconds() {
                None => write!(f, "[SKIP] {}: {}", result.identifier(), result.imap().detail()),
                Some(seconds) => write!(
                    f,
                    "[{}] IMAP={}; SMTP={}; {seconds:.2}s",
                    result.identifier(),
                    result.imap().status_token(),
                    result.smtp().status_token(),
                ),
            },
            Self::Pacing { delay, .. } => write!(
                f,
                "  Sleeping {}s before next account...",
                delay.as_secs_f64()
            ),
        }
    }
}

/// Collects results into input-order slots and streams progress.
///
/// Shared by every worker of a run; each call takes the slot lock briefly
/// and never across an await point.
#[derive(Debug)]
pub struct ReportAggregator {
    slots: Mutex<Vec<Option<AccountResult>>>,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl ReportAggregator {
    /// Creates an aggregator expecting `len` results.
    #[must_use]
    pub fn new(len: usize, progress: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self {
            slots: Mutex::new(vec![None; len]),
            progress,
        }
    }

    /// Announces that the account at `index` is being probed.
    pub fn started(&self, index: usize, identifier: &str) {
        self.emit(ProgressEvent::Started {
            index,
            identifier: identifier.to_string(),
        });
    }

    /// Announces a pacing pause.
    pub fn pacing(&self, identifier: &str, delay: Duration) {
        tracing::info!(identifier, delay_s = delay.as_secs_f64(), "pausing before next account");
        self.emit(ProgressEvent::Pacing {
            identifier: identifier.to_string(),
            delay,
        });
    }

    /// Stores the final result for the account at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateResult`] if the slot is already filled and
    /// [`Error::MissingResult`] if `index` is out of range.
    pub fn record(&self, index: usize, result: AccountResult) -> Result<()> {
        {
            let mut slots = self.lock();
            let slot = slots.get_mut(index).ok_or(Error::MissingResult(index))?;
            if slot.is_some() {
                return Err(Error::DuplicateResult(index));
            }
            *slot = Some(result.clone());
        }
        self.emit(ProgressEvent::Finished { index, result });
        Ok(())
    }

    /// Takes the collected results as a report in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingResult`] for the first unresolved account.
    pub fn finish(&self) -> Result<Report> {
        let slots = std::mem::take(&mut *self.lock());
        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(Error::MissingResult(index)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Report::new(results))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<AccountResult>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.progress {
            // A closed receiver only means nobody is watching.
            let _ = progress.send(event);
        }
    }
}
