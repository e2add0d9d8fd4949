//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from its response lines (CRLF already stripped).
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `235 2.7.0 Accepted`
/// - Multi: `250-smtp.gmail.com at your service`, `250-SIZE 35882577`, `250 SMTPUTF8`
///
/// Every line must carry the same three-digit code.
///
/// # Errors
///
/// Returns an error if the reply is empty or a line is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;
    let code = reply_code(first)?;

    let message = lines
        .iter()
        .map(|line| {
            if reply_code(line)? != code {
                return Err(Error::Protocol(format!(
                    "reply code changed mid-reply: {line}"
                )));
            }
            Ok(line.get(4..).unwrap_or_default().to_string())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Reply::new(ReplyCode::new(code), message))
}

/// Checks if a line is the last line of a reply.
///
/// Continuation lines use `-` after the code; the final line uses a space
/// or nothing at all.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.as_bytes().get(3) != Some(&b'-')
}

fn reply_code(line: &str) -> Result<u16> {
    let malformed = || Error::Protocol(format!("malformed reply line: {line:?}"));

    let digits = line
        .get(..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(malformed)?;
    if !matches!(line.as_bytes().get(3), None | Some(b' ' | b'-')) {
        return Err(malformed());
    }
    digits.parse().map_err(|_| malformed())
}
