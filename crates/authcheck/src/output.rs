//! Report writer.

use std::io::Write;

use authcheck_core::Report;
use serde::Serialize;

const HEADER: [&str; 6] = [
    "email",
    "imap_ok",
    "imap_error",
    "smtp_ok",
    "smtp_error",
    "elapsed_s",
];

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    email: &'a str,
    imap_ok: &'a str,
    imap_error: &'a str,
    smtp_ok: &'a str,
    smtp_error: &'a str,
    elapsed_s: String,
}

/// Writes the report as CSV, one row per account in input order.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report<W: Write>(writer: W, report: &Report) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADER)?;

    for result in report {
        writer.serialize(ReportRow {
            email: result.identifier(),
            imap_ok: result.imap().status_token(),
            imap_error: result.imap().detail(),
            smtp_ok: result.smtp().status_token(),
            smtp_error: result.smtp().detail(),
            elapsed_s: result
                .elapsed_seconds()
                .map(|s| format!("{s:.2}"))
                .unwrap_or_default(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
