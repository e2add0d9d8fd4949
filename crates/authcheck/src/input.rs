//! Account list reader.
//!
//! Expects a CSV file with a header row naming `email` and `app_password`.
//! Other columns are ignored. Rows missing either value are kept as skipped
//! accounts so the report still has one row per input row.

use std::io::Read;

use anyhow::Context;
use authcheck_core::{Account, SkipReason};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_password: Option<String>,
}

/// Reads accounts in file order.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or a row cannot be decoded.
pub fn read_accounts<R: Read>(reader: R) -> anyhow::Result<Vec<Account>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<Row>()
        .enumerate()
        .map(|(i, row)| {
            // Row 1 is the header.
            let line = i + 2;
            let row = row.with_context(|| format!("malformed CSV row {line}"))?;
            Ok(account_from_row(row, line))
        })
        .collect()
}

fn account_from_row(row: Row, line: usize) -> Account {
    let email = row.email.filter(|e| !e.trim().is_empty());
    let password = row.app_password.filter(|p| !p.trim().is_empty());

    match (email, password) {
        (None, _) => Account::skipped(format!("(row {line})"), SkipReason::custom("missing email")),
        (Some(email), None) => Account::skipped(email, SkipReason::custom("missing app_password")),
        (Some(email), Some(password)) => Account::new(email, Some(SecretString::new(password))),
    }
}
