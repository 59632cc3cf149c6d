use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape shared by the core and the AI client.
///
/// `message` is safe to show a user. Provider output, IO errors and other raw text only ever
/// go into `details`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

/// Coarse classification of error codes, used for logging and for deciding how a failure is
/// surfaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Schema,
    Cancelled,
    Persistence,
    NotFound,
    Config,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Schema => "schema",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Persistence => "persistence",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Config => "config",
            ErrorKind::Other => "other",
        }
    }
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        let code = self.code.as_str();
        match code {
            "ANALYSIS_CANCELLED" => ErrorKind::Cancelled,
            "HISTORY_ENTRY_NOT_FOUND" => ErrorKind::NotFound,
            "AI_REMOTE_NOT_ALLOWED" | "AI_CONFIG_INVALID" => ErrorKind::Config,
            _ if code.starts_with("ANALYSIS_INPUT_") || code.starts_with("SESSION_") => {
                ErrorKind::Validation
            }
            _ if code.starts_with("AI_TRANSPORT_") || code.starts_with("AI_PROVIDER_") => {
                ErrorKind::Transport
            }
            _ if code.starts_with("AI_RESPONSE_") => ErrorKind::Schema,
            _ if code.starts_with("STORE_") || code.starts_with("DB_") => ErrorKind::Persistence,
            _ => ErrorKind::Other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
