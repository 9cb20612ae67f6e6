//! Shared error type across loth crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Frame could not be parsed under its tag.
    Malformed,
    /// Tag is well-formed but not one this client handles.
    UnknownCommand,
    /// Outbound body failed to serialize.
    Encode,
    /// Socket-level failure.
    Transport,
    /// Ticket acquisition failed.
    Ticket,
    /// Invalid configuration.
    Config,
    /// Persistence collaborator failed.
    Store,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Ticket => "TICKET",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Store => "STORE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LothError>;

/// Unified error type used by core and bot.
#[derive(Debug, Error)]
pub enum LothError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("ticket: {0}")]
    Ticket(String),
    #[error("config: {0}")]
    Config(String),
    #[error("store: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LothError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LothError::Malformed(_) => ErrorCode::Malformed,
            LothError::UnknownCommand(_) => ErrorCode::UnknownCommand,
            LothError::Encode(_) => ErrorCode::Encode,
            LothError::Transport(_) => ErrorCode::Transport,
            LothError::Ticket(_) => ErrorCode::Ticket,
            LothError::Config(_) => ErrorCode::Config,
            LothError::Store(_) => ErrorCode::Store,
            LothError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Unknown tags are expected traffic, not failures.
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, LothError::UnknownCommand(_))
    }
}
