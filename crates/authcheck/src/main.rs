//! `authcheck` - bulk IMAP/SMTP app-password checker.
//!
//! Logs in to every account from a CSV file over IMAP and SMTP submission,
//! never sends mail, and writes a per-account report.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod input;
mod output;
mod progress;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};

use anyhow::Context;
use authcheck_core::{Engine, NetworkVerifier, Scheduler};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.run_config().context("invalid options")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli::default_log_filter(&config).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let file = File::open(&cli.input)
        .with_context(|| format!("cannot open {}", cli.input.display()))?;
    let accounts = input::read_accounts(BufReader::new(file))
        .with_context(|| format!("cannot read accounts from {}", cli.input.display()))?;

    let valid = accounts.iter().filter(|a| a.is_probeable()).count();
    println!(
        "Testing {valid} valid account(s) (skipping {} row(s) missing email/app_password) \
         with concurrency={} timeout={}s ...",
        accounts.len() - valid,
        config.concurrency,
        config.timeout.as_secs(),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(progress::render(rx, io::stdout()));

    let engine =
        Engine::new(NetworkVerifier::new(config.endpoints.clone()), &config)?.with_progress(tx);
    info!(
        accounts = accounts.len(),
        concurrency = engine.concurrency(),
        "starting verification"
    );
    let report = engine.run(accounts).await?;
    drop(engine);
    printer.await.context("progress printer stopped")??;

    let out = File::create(&cli.out)
        .with_context(|| format!("cannot create {}", cli.out.display()))?;
    output::write_report(BufWriter::new(out), &report)
        .with_context(|| format!("cannot write report to {}", cli.out.display()))?;

    let summary = report.summary();
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "verification finished"
    );
    println!("Done. Report written to: {}", cli.out.display());
    Ok(())
}
