//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use authcheck_core::{ConfigError, Endpoints, RunConfig};
use clap::Parser;

/// Bulk-verify app passwords over IMAP and SMTP without sending mail.
#[derive(Parser, Debug)]
#[command(name = "authcheck", version, about)]
pub struct Cli {
    /// CSV file with `email` and `app_password` columns
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the report CSV
    #[arg(long, default_value = "app_pw_report.csv")]
    pub out: PathBuf,

    /// Accounts probed at the same time
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Seconds allowed for each protocol check
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// Show step-by-step progress
    #[arg(long)]
    pub verbose: bool,

    /// Probe one account at a time (easier to follow the logs)
    #[arg(long)]
    pub sequential: bool,

    /// Seconds to wait after an account where both logins succeeded
    #[arg(long, default_value_t = 0)]
    pub delay_on_success: u64,

    /// Milliseconds between the IMAP and SMTP checks of one account
    #[arg(long, default_value_t = 500)]
    pub inter_protocol_pause_ms: u64,

    /// IMAP server
    #[arg(long, default_value = "imap.gmail.com")]
    pub imap_host: String,

    /// IMAP implicit-TLS port
    #[arg(long, default_value_t = 993)]
    pub imap_port: u16,

    /// SMTP server
    #[arg(long, default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP implicit-TLS port
    #[arg(long, default_value_t = 465)]
    pub smtp_port: u16,

    /// SMTP STARTTLS port tried when implicit TLS is unreachable
    #[arg(long, default_value_t = 587)]
    pub smtp_starttls_port: u16,

    /// Never fall back to STARTTLS
    #[arg(long)]
    pub no_starttls_fallback: bool,
}

impl Cli {
    /// Converts the options into a validated run configuration.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let endpoints = Endpoints {
            imap_host: self.imap_host.clone(),
            imap_port: self.imap_port,
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            smtp_starttls_port: (!self.no_starttls_fallback).then_some(self.smtp_starttls_port),
        };
        let builder = RunConfig::builder()
            .timeout(Duration::from_secs(self.timeout))
            .concurrency(self.concurrency)
            .delay_on_success(Duration::from_secs(self.delay_on_success))
            .inter_protocol_pause(Duration::from_millis(self.inter_protocol_pause_ms))
            .verbose(self.verbose)
            .endpoints(endpoints);
        if self.sequential {
            builder.sequential().build()
        } else {
            builder.build()
        }
    }
}

/// Returns the `RUST_LOG` filter used when the environment sets none.
pub const fn default_log_filter(config: &RunConfig) -> &'static str {
    if config.verbose {
        "authcheck=debug,authcheck_core=debug,authcheck_imap=debug,authcheck_smtp=debug"
    } else {
        "authcheck=info,authcheck_core=info"
    }
}
