//! Error types

use thiserror::Error;

/// Recoverable failure of a single command.
///
/// Never returned from `dispatch`; the dispatcher turns it into a
/// `CommandFailed` event carrying the command's correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The payload references a missing object or one of the wrong kind
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// No handler is registered for the command type
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl CommandError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CommandError::InvalidArguments(message.into())
    }

    /// The bare message, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            CommandError::InvalidArguments(message) | CommandError::UnknownCommand(message) => {
                message
            }
        }
    }
}

/// Failure converting between a backend wire shape and the domain model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The wire object has no domain representation
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A required wire field is missing or has an unexpected shape
    #[error("malformed wire object: {0}")]
    Malformed(String),
}

/// Failure loading a [`SessionConfig`](crate::config::SessionConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by event handler actions
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
