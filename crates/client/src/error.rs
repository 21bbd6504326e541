use std::path::PathBuf;

use opsdesk_core::ApplicationError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("network failure: {0}")]
    Network(String),
    /// Non-2xx response. `message` is the server's own text when it sent one.
    #[error("server responded {status}: {message}")]
    Server { status: u16, message: String },
    /// 2xx response carrying `success: false`.
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("could not read attachment `{path}`: {message}")]
    Attachment { path: PathBuf, message: String },
}

impl ClientError {
    /// The message to put in front of a user, unchanged from the server
    /// when the server supplied one.
    pub fn server_message(&self) -> String {
        match self {
            Self::Server { message, .. } | Self::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for ApplicationError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Network(message) => Self::Network(message),
            ClientError::Server { status, message } => Self::Server { status, message },
            // A 2xx refusal is still the server saying no.
            ClientError::Rejected { message } => Self::Server { status: 422, message },
            ClientError::Decode(message) => Self::Network(format!("malformed response: {message}")),
            ClientError::Attachment { path, message } => {
                Self::Configuration(format!("attachment `{}`: {message}", path.display()))
            }
        }
    }
}
