use std::io;

/// Failure reported by a [`Validator`](crate::command::Validator) before a command runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while resolving, registering or running commands
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{token}: command not found")]
    CommandNotFound { token: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Command '{command}' is not active")]
    ActivationDenied { command: String },

    #[error("Command '{command}' failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Read interrupted")]
    InterruptedRead,

    #[error("End of input")]
    EndOfInput,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found(token: impl Into<String>) -> Self {
        Error::CommandNotFound {
            token: token.into(),
        }
    }

    /// True for errors a command should treat as an abort rather than a failure.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Error::InterruptedRead | Error::EndOfInput)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(inner) => inner,
            Err(other) => Error::Other(format!("{other:#}")),
        }
    }
}

/// Result type alias for shellkit operations
pub type Result<T> = std::result::Result<T, Error>;
