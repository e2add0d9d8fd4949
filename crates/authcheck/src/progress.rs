//! Console progress printer.

use std::io::{self, Write};

use authcheck_core::ProgressEvent;
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints one line per event until every sender is gone.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub async fn render<W: Write>(
    mut events: UnboundedReceiver<ProgressEvent>,
    mut out: W,
) -> io::Result<()> {
    while let Some(event) = events.recv().await {
        writeln!(out, "{event}")?;
        out.flush()?;
    }
    Ok(())
}
