//! Execution strategies.
//!
//! [`Sequential`] probes one account at a time; [`Pooled`] keeps up to
//! `concurrency` probes in flight. Both return the report in input order,
//! and [`Engine`] picks one from the [`RunConfig`].

mod pooled;
mod sequential;

pub use pooled::Pooled;
pub use sequential::Sequential;

use std::future::Future;

use secrecy::SecretString;
use tokio::sync::mpsc::UnboundedSender;

use crate::account::Account;
use crate::config::RunConfig;
use crate::error::Result;
use crate::outcome::{AccountResult, Report};
use crate::pacing::PacingPolicy;
use crate::probe::{AccountProbe, Verifier};
use crate::report::ProgressEvent;

/// Identifier and secret of an account cleared for probing.
type Credentials = (String, SecretString);

/// Separates an account cleared for probing from a skipped one, which is
/// resolved to its final row here and never reaches the probe.
fn triage(account: Account) -> std::result::Result<Credentials, AccountResult> {
    match account.into_parts() {
        (identifier, Ok(secret)) => Ok((identifier, secret)),
        (identifier, Err(reason)) => Err(AccountResult::skipped(identifier, reason.to_string())),
    }
}

/// Drives a list of accounts through the probe.
pub trait Scheduler {
    /// Probes every account once and returns one row per account, in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns an error only for run-level failures; per-account failures
    /// are rows in the report.
    fn run(&self, accounts: Vec<Account>) -> impl Future<Output = Result<Report>> + Send;
}

/// Strategy chosen from the run configuration.
#[derive(Debug)]
pub enum Engine<V> {
    /// `concurrency == 1`.
    Sequential(Sequential<V>),
    /// `concurrency > 1`.
    Pooled(Pooled<V>),
}

impl<V: Verifier + 'static> Engine<V> {
    /// Builds the strategy `config` asks for around `verifier`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` fails
    /// validation.
    pub fn new(verifier: V, config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let probe = AccountProbe::from_config(verifier, config);
        let pacing = PacingPolicy::from_config(config);
        Ok(if config.is_sequential() {
            Self::Sequential(Sequential::new(probe, pacing))
        } else {
            Self::Pooled(Pooled::new(probe, pacing, config.concurrency))
        })
    }

    /// Streams progress events to `progress`.
    #[must_use]
    pub fn with_progress(self, progress: UnboundedSender<ProgressEvent>) -> Self {
        match self {
            Self::Sequential(s) => Self::Sequential(s.with_progress(progress)),
            Self::Pooled(p) => Self::Pooled(p.with_progress(progress)),
        }
    }

    /// Returns the number of probes that may run at once.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        match self {
            Self::Sequential(_) => 1,
            Self::Pooled(p) => p.concurrency(),
        }
    }
}

impl<V: Verifier + 'static> Scheduler for Engine<V> {
    async fn run(&self, accounts: Vec<Account>) -> Result<Report> {
        match self {
            Self::Sequential(s) => s.run(accounts).await,
            Self::Pooled(p) => p.run(accounts).await,
        }
    }
}
