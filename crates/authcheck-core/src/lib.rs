//! # authcheck-core
//!
//! Verification engine for bulk credential checks.
//!
//! Every account is probed twice, once over IMAP and once over SMTP
//! submission, and every probe resolves to a [`ProtocolOutcome`]. A
//! [`Scheduler`] drives the accounts either one at a time or through a
//! bounded pool, applies the [`PacingPolicy`] between accounts, and hands
//! the results to a [`ReportAggregator`] that keeps them in input order.
//!
//! ```ignore
//! use authcheck_core::{Engine, NetworkVerifier, RunConfig};
//!
//! let config = RunConfig::builder().concurrency(4).build()?;
//! let engine = Engine::new(NetworkVerifier::new(config.endpoints.clone()), &config)?;
//! let report = engine.run(accounts).await?;
//! ```
//!
//! Per-account failures never abort a run; only the run-level conditions
//! in [`Error`] do.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
mod error;
pub mod outcome;
pub mod pacing;
pub mod probe;
pub mod report;
pub mod scheduler;

pub use account::{Account, SkipReason};
pub use config::{ConfigError, Endpoints, RunConfig, RunConfigBuilder};
pub use error::{Error, Result};
pub use outcome::{AccountResult, ProbeError, Protocol, ProtocolOutcome, Report, Summary};
pub use pacing::PacingPolicy;
pub use probe::{AccountProbe, NetworkVerifier, Verifier};
pub use report::{ProgressEvent, ReportAggregator};
pub use scheduler::{Engine, Pooled, Scheduler, Sequential};
