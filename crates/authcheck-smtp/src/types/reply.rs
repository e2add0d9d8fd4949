//! SMTP reply types.

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message lines, without code and separator.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full message as a single line.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join(" ")
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 421 Service not available, closing transmission channel
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 454 Temporary authentication failure
    pub const AUTH_TEMPORARY_FAILURE: Self = Self(454);
    /// 530 Authentication required
    pub const AUTH_REQUIRED: Self = Self(530);
    /// 534 Authentication mechanism is too weak (or, at Google, web login required)
    pub const AUTH_TOO_WEAK: Self = Self(534);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);

    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if the code rejects credentials.
    #[must_use]
    pub const fn rejects_credentials(self) -> bool {
        matches!(self.0, 530 | 534 | 535)
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classes() {
        assert!(ReplyCode::AUTH_SUCCEEDED.is_success());
        assert!(ReplyCode::CLOSING.is_success());
        assert!(!ReplyCode::SERVICE_UNAVAILABLE.is_success());
    }

    #[test]
    fn test_credential_rejections() {
        assert!(ReplyCode::AUTH_FAILED.rejects_credentials());
        assert!(ReplyCode::AUTH_TOO_WEAK.rejects_credentials());
        assert!(!ReplyCode::AUTH_TEMPORARY_FAILURE.rejects_credentials());
        assert!(!ReplyCode::SERVICE_UNAVAILABLE.rejects_credentials());
    }

    #[test]
    fn test_message_text_joins_lines() {
        let reply = Reply::new(
            ReplyCode::AUTH_FAILED,
            vec![
                "5.7.8 Username and Password not accepted.".to_string(),
                "5.7.8 https://support.google.com/mail/?p=BadCredentials".to_string(),
            ],
        );
        assert_eq!(
            reply.message_text(),
            "5.7.8 Username and Password not accepted. 5.7.8 https://support.google.com/mail/?p=BadCredentials"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReplyCode::AUTH_FAILED.to_string(), "535");
    }
}
