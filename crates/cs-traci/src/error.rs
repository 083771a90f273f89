use thiserror::Error;

/// Errors on the control channel.
///
/// Every variant is unrecoverable for a running co-simulation: once an
/// exchange fails the external simulator's state can no longer be trusted.
#[derive(Debug, Error)]
pub enum TraciError {
    #[error("control channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated message: needed {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("command {command:#04x} failed with status {status:#04x}: {description}")]
    CommandFailed {
        command:     u8,
        status:      u8,
        description: String,
    },

    #[error("expected response to command {expected:#04x}, got {got:#04x}")]
    UnexpectedCommand { expected: u8, got: u8 },

    #[error("expected value type {expected:#04x}, got {got:#04x}")]
    UnexpectedType { expected: u8, got: u8 },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("control channel is closed")]
    Closed,
}

pub type TraciResult<T> = Result<T, TraciError>;
