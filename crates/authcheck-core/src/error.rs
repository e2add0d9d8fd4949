//! Run-level errors.
//!
//! Per-account failures are never errors here; they become
//! [`ProtocolOutcome::Failure`](crate::ProtocolOutcome::Failure) rows.

use thiserror::Error;

use crate::config::ConfigError;

/// Conditions that stop a run before a complete report exists.
#[derive(Debug, Error)]
pub enum Error {
    /// The run configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A pool worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// An account was resolved twice.
    #[error("Duplicate result for account #{0}")]
    DuplicateResult(usize),

    /// An account was never resolved.
    #[error("Missing result for account #{0}")]
    MissingResult(usize),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
