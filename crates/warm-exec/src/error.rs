use thiserror::Error;

use warm_core::backend::BackendError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("a run is already in progress: {run_id}")]
    Busy { run_id: String },

    #[error("failed to signal process group {pgid}: {source}")]
    Signal {
        pgid: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecError::InvalidCommand(_) => "invalid_command",
            ExecError::Spawn { .. } => "spawn_failed",
            ExecError::Busy { .. } => "busy",
            ExecError::Signal { .. } => "signal_failed",
            ExecError::Io(_) => "io",
            ExecError::Internal(_) => "internal",
        }
    }
}

impl From<ExecError> for BackendError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::InvalidCommand(msg) => BackendError::InvalidConfig(msg),
            ExecError::Signal { .. } => BackendError::Cancel(e.to_string()),
            ExecError::Io(io) => BackendError::from(io),
            other => BackendError::Run(other.to_string()),
        }
    }
}
