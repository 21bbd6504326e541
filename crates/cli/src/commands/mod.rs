pub mod config;
pub mod doctor;
pub mod form;
pub mod request;
pub mod ticket;

use opsdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use opsdesk_core::{ApplicationError, InterfaceError, Notice};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Successful command with a structured body instead of a message.
    pub fn report<P: Serialize>(command: &str, payload: &P) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }

    pub fn with_exit_code(mut self, exit_code: u8) -> Self {
        self.exit_code = exit_code;
        self
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::load(LoadOptions::default())
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Maps a failed API interaction to a command failure. Server rejections are
/// shown verbatim; anything else keeps the underlying cause for operators.
pub(crate) fn api_failure(command: &str, error: ApplicationError) -> CommandResult {
    let interface = error.into_interface(format!("cli-{}", Uuid::new_v4()));
    warn!(
        event_name = "cli.command_failed",
        command,
        correlation_id = interface.correlation_id(),
        error = %interface,
        "command failed"
    );

    let notice = Notice::from(&interface);
    let (error_class, message) = match &interface {
        InterfaceError::Rejected { .. } => ("rejected", notice.message),
        InterfaceError::BadRequest { .. } => ("bad_request", interface.to_string()),
        InterfaceError::ServiceUnavailable { .. } => {
            ("service_unavailable", format!("{} ({interface})", notice.message))
        }
        InterfaceError::Internal { .. } => ("internal", interface.to_string()),
    };
    CommandResult::failure(command, error_class, message, 6)
}
