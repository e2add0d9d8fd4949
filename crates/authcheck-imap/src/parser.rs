//! IMAP response parser.
//!
//! A sans-I/O parser for the response lines a login check can receive:
//! status responses (`OK`/`NO`/`BAD`/`PREAUTH`/`BYE`, tagged or untagged),
//! `CAPABILITY` data and continuation requests. Any other untagged data is
//! kept as raw text.
//!
//! ```
//! use authcheck_imap::parser::{Response, ResponseCode, ResponseParser, Status};
//!
//! let response = ResponseParser::parse(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n").unwrap();
//! match response {
//!     Response::Tagged { status, code, .. } => {
//!         assert_eq!(status, Status::No);
//!         assert_eq!(code, Some(ResponseCode::AuthenticationFailed));
//!     }
//!     _ => panic!("expected tagged response"),
//! }
//! ```

use crate::{Error, Result};

/// Response status condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command succeeded.
    Ok,
    /// Command failed.
    No,
    /// Command was malformed or not allowed.
    Bad,
    /// Connection is already authenticated (greeting only).
    PreAuth,
    /// Server is closing the connection.
    Bye,
}

impl Status {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "NO" => Some(Self::No),
            "BAD" => Some(Self::Bad),
            "PREAUTH" => Some(Self::PreAuth),
            "BYE" => Some(Self::Bye),
            _ => None,
        }
    }
}

/// Bracketed response code (`[...]`) attached to a status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `CAPABILITY` list carried in a greeting or LOGIN completion.
    Capability(Vec<String>),
    /// `ALERT`: text must be shown to the user.
    Alert,
    /// `AUTHENTICATIONFAILED` (RFC 5530).
    AuthenticationFailed,
    /// `UNAVAILABLE` (RFC 5530): temporary server-side failure.
    Unavailable,
    /// Any other code, verbatim.
    Other(String),
}

impl ResponseCode {
    fn parse(raw: &str) -> Self {
        let mut words = raw.split_ascii_whitespace();
        let keyword = words.next().unwrap_or_default().to_ascii_uppercase();
        match keyword.as_str() {
            "CAPABILITY" => Self::Capability(words.map(str::to_ascii_uppercase).collect()),
            "ALERT" => Self::Alert,
            "AUTHENTICATIONFAILED" => Self::AuthenticationFailed,
            "UNAVAILABLE" => Self::Unavailable,
            _ => Self::Other(raw.to_string()),
        }
    }
}

/// Untagged (`*`) server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Untagged {
    /// Untagged status response.
    Status {
        /// Condition.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `CAPABILITY` data.
    Capability(Vec<String>),
    /// Any other server data, without the leading `* `.
    Data(String),
}

/// A parsed IMAP response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: String,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response.
    Untagged(Untagged),
    /// Continuation request (`+`).
    Continuation(String),
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response line (with or without the trailing CRLF).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the line is empty or a tagged response
    /// lacks a valid status.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let line = String::from_utf8_lossy(input);
        let line = line.trim_end_matches(['\r', '\n']);

        let (head, rest) = split_word(line);
        match head {
            "" => Err(Error::Parse {
                position: 0,
                message: "empty response line".to_string(),
            }),
            "+" => Ok(Response::Continuation(rest.to_string())),
            "*" => Ok(Response::Untagged(Self::parse_untagged(rest))),
            tag => {
                let (word, rest) = split_word(rest);
                let status = Status::parse(word).ok_or_else(|| Error::Parse {
                    position: tag.len() + 1,
                    message: format!("expected status after tag {tag}, got {word:?}"),
                })?;
                let (code, text) = parse_resp_text(rest);
                Ok(Response::Tagged {
                    tag: tag.to_string(),
                    status,
                    code,
                    text,
                })
            }
        }
    }

    fn parse_untagged(body: &str) -> Untagged {
        let (word, rest) = split_word(body);
        if let Some(status) = Status::parse(word) {
            let (code, text) = parse_resp_text(rest);
            return Untagged::Status { status, code, text };
        }
        if word.eq_ignore_ascii_case("CAPABILITY") {
            return Untagged::Capability(
                rest.split_ascii_whitespace()
                    .map(str::to_ascii_uppercase)
                    .collect(),
            );
        }
        Untagged::Data(body.to_string())
    }
}

/// Splits off the first space-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    s.split_once(' ').unwrap_or((s, ""))
}

/// Parses `resp-text`: an optional `[code]` followed by free text.
fn parse_resp_text(s: &str) -> (Option<ResponseCode>, String) {
    let s = s.trim_start();
    if let Some(inner) = s.strip_prefix('[')
        && let Some((code, text)) = inner.split_once(']')
    {
        return (Some(ResponseCode::parse(code)), text.trim().to_string());
    }
    (None, s.trim_end().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_greeting_with_capabilities() {
        let response =
            ResponseParser::parse(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] Gimap ready\r\n")
                .unwrap();
        assert_eq!(
            response,
            Response::Untagged(Untagged::Status {
                status: Status::Ok,
                code: Some(ResponseCode::Capability(vec![
                    "IMAP4REV1".to_string(),
                    "AUTH=PLAIN".to_string()
                ])),
                text: "Gimap ready".to_string(),
            })
        );
    }

    #[test]
    fn test_tagged_ok() {
        let response = ResponseParser::parse(b"A0001 OK LOGIN completed\r\n").unwrap();
        assert_eq!(
            response,
            Response::Tagged {
                tag: "A0001".to_string(),
                status: Status::Ok,
                code: None,
                text: "LOGIN completed".to_string(),
            }
        );
    }

    #[test]
    fn test_tagged_no_with_code() {
        let response =
            ResponseParser::parse(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials (Failure)\r\n")
                .unwrap();
        match response {
            Response::Tagged { status, code, text, .. } => {
                assert_eq!(status, Status::No);
                assert_eq!(code, Some(ResponseCode::AuthenticationFailed));
                assert_eq!(text, "Invalid credentials (Failure)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_untagged_capability() {
        let response = ResponseParser::parse(b"* CAPABILITY IMAP4rev1 IDLE\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(Untagged::Capability(vec![
                "IMAP4REV1".to_string(),
                "IDLE".to_string()
            ]))
        );
    }

    #[test]
    fn test_untagged_bye() {
        let response = ResponseParser::parse(b"* BYE LOGOUT Requested\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Untagged(Untagged::Status {
                status: Status::Bye,
                ..
            })
        ));
    }

    #[test]
    fn test_untagged_data() {
        let response = ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(Untagged::Data("23 EXISTS".to_string()))
        );
    }

    #[test]
    fn test_continuation() {
        let response = ResponseParser::parse(b"+ go ahead\r\n").unwrap();
        assert_eq!(response, Response::Continuation("go ahead".to_string()));
    }

    #[test]
    fn test_errors() {
        assert!(ResponseParser::parse(b"\r\n").is_err());
        assert!(ResponseParser::parse(b"A0001 MAYBE\r\n").is_err());
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = ResponseParser::parse(&input);
        }
    }
}
