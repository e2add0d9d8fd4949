//! Run configuration.

use std::time::Duration;

/// Default per-protocol timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default pool size.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default pause between the IMAP and SMTP checks of one account.
pub const DEFAULT_INTER_PROTOCOL_PAUSE: Duration = Duration::from_millis(500);

/// Errors detected while building a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Concurrency must be at least 1.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    /// A zero timeout would fail every probe.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// A server hostname is empty.
    #[error("{0} host must not be empty")]
    EmptyHost(&'static str),

    /// A server port is zero.
    #[error("{0} port must not be zero")]
    ZeroPort(&'static str),
}

/// Service endpoints probed for every account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// IMAP server hostname.
    pub imap_host: String,
    /// IMAP implicit-TLS port.
    pub imap_port: u16,
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP implicit-TLS port.
    pub smtp_port: u16,
    /// SMTP STARTTLS port tried when implicit TLS cannot be reached.
    /// `None` disables the fallback.
    pub smtp_starttls_port: Option<u16>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            imap_host: "imap.gmail.com".to_string(),
            imap_port: authcheck_imap::IMAPS_PORT,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: authcheck_smtp::SUBMISSIONS_PORT,
            smtp_starttls_port: Some(authcheck_smtp::SUBMISSION_PORT),
        }
    }
}

impl Endpoints {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.imap_host.trim().is_empty() {
            return Err(ConfigError::EmptyHost("IMAP"));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(ConfigError::EmptyHost("SMTP"));
        }
        if self.imap_port == 0 {
            return Err(ConfigError::ZeroPort("IMAP"));
        }
        if self.smtp_port == 0 || self.smtp_starttls_port == Some(0) {
            return Err(ConfigError::ZeroPort("SMTP"));
        }
        Ok(())
    }
}

/// Options for one verification run. Read-only once the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Upper bound on each protocol attempt.
    pub timeout: Duration,
    /// 1 runs accounts one at a time; more runs a bounded pool.
    pub concurrency: usize,
    /// Pause after an account where both protocols succeeded.
    pub delay_on_success: Duration,
    /// Pause between the IMAP and SMTP attempts of one account.
    pub inter_protocol_pause: Duration,
    /// Emit step-by-step diagnostics.
    pub verbose: bool,
    /// Servers to probe.
    pub endpoints: Endpoints,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            delay_on_success: Duration::ZERO,
            inter_protocol_pause: DEFAULT_INTER_PROTOCOL_PAUSE,
            verbose: false,
            endpoints: Endpoints::default(),
        }
    }
}

impl RunConfig {
    /// Creates a configuration builder starting from the defaults.
    #[must_use]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Returns true if accounts are probed one at a time.
    #[must_use]
    pub const fn is_sequential(&self) -> bool {
        self.concurrency <= 1
    }

    /// Checks the invariants [`RunConfigBuilder::build`] enforces, for a
    /// configuration assembled field by field.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero concurrency or timeout, or an
    /// empty host or zero port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.endpoints.validate()
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Sets the per-protocol timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Forces one-at-a-time execution.
    #[must_use]
    pub const fn sequential(mut self) -> Self {
        self.config.concurrency = 1;
        self
    }

    /// Sets the pause applied after a fully successful account.
    #[must_use]
    pub const fn delay_on_success(mut self, delay: Duration) -> Self {
        self.config.delay_on_success = delay;
        self
    }

    /// Sets the pause between the IMAP and SMTP attempts.
    #[must_use]
    pub const fn inter_protocol_pause(mut self, pause: Duration) -> Self {
        self.config.inter_protocol_pause = pause;
        self
    }

    /// Enables step-by-step diagnostics.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Sets the servers to probe.
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero concurrency or timeout, or an
    /// empty host or zero port.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
