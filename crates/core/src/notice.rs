use serde::Serialize;

use crate::errors::InterfaceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, user-facing message. Every failure that reaches a user ends
/// up as one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn submitted(reference: &str) -> Self {
        Self::success(format!("Request {reference} submitted successfully"))
    }
}

impl From<&InterfaceError> for Notice {
    fn from(error: &InterfaceError) -> Self {
        Self::error(error.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeLevel};
    use crate::errors::InterfaceError;

    #[test]
    fn rejected_error_becomes_verbatim_error_notice() {
        let error = InterfaceError::Rejected {
            status: 409,
            message: "Request already approved".to_string(),
            correlation_id: "c-1".to_string(),
        };
        let notice = Notice::from(&error);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Request already approved");
    }

    #[test]
    fn submitted_notice_names_the_reference() {
        assert_eq!(Notice::submitted("IT-2026-0042").message, "Request IT-2026-0042 submitted successfully");
    }
}
