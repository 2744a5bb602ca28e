//! Error facility for logfacade
//!
//! Every fallible facade operation returns [`LogError`]. Each variant maps to
//! a [`LogErrorKind`] carrying a stable error code, so callers and tests can
//! match on the classification instead of the message text.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Canonical error kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogErrorKind {
    InvalidConfig,
    ConfigParse,
    Io,
    WriteTooLarge,
}

impl LogErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            LogErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            LogErrorKind::ConfigParse => "ERR_CONFIG_PARSE",
            LogErrorKind::Io => "ERR_IO",
            LogErrorKind::WriteTooLarge => "ERR_WRITE_TOO_LARGE",
        }
    }
}

/// Errors raised while building loggers or writing to sinks
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Failed to parse configuration: {reason}")]
    ConfigParse { reason: String },

    #[error("I/O error while trying to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Write of {len} bytes exceeds maximum file size of {max} bytes")]
    WriteTooLarge { len: u64, max: u64 },
}

impl LogError {
    /// Build an invalid-configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LogError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build an I/O error tagged with the action and path involved
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> LogErrorKind {
        match self {
            LogError::InvalidConfig { .. } => LogErrorKind::InvalidConfig,
            LogError::ConfigParse { .. } => LogErrorKind::ConfigParse,
            LogError::Io { .. } => LogErrorKind::Io,
            LogError::WriteTooLarge { .. } => LogErrorKind::WriteTooLarge,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Sinks surface their failures through `io::Write`, so the facade error is
/// carried inside an `io::Error` and can be recovered with `downcast`.
impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        match err {
            LogError::Io { source, .. } => source,
            LogError::WriteTooLarge { .. } => io::Error::new(io::ErrorKind::InvalidInput, err),
            other => io::Error::other(other),
        }
    }
}
