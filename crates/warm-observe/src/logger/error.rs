use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),

    #[error("journald is not supported on this platform")]
    JournaldNotSupported,

    #[error("failed to initialize journald: {0}")]
    JournaldInitFailed(String),

    #[error("logger already initialized")]
    AlreadyInitialized,

    #[error("invalid timezone: {0} (expected: utc|local)")]
    InvalidTimeZone(String),

    #[error("invalid log filter: {0}")]
    InvalidLevel(String),
}

impl LoggerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LoggerError::InvalidFormat(_) => "invalid_format",
            LoggerError::JournaldNotSupported => "journald_not_supported",
            LoggerError::JournaldInitFailed(_) => "journald_init_failed",
            LoggerError::AlreadyInitialized => "already_initialized",
            LoggerError::InvalidTimeZone(_) => "invalid_timezone",
            LoggerError::InvalidLevel(_) => "invalid_level",
        }
    }
}

pub type LoggerResult<T> = Result<T, LoggerError>;
