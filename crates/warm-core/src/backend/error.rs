use thiserror::Error;

/// Errors produced by a strategy backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend does not override this capability.
    #[error("backend '{backend}' does not implement {operation}")]
    NotImplemented {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("warm-up failed: {0}")]
    WarmUp(String),

    #[error("run failed: {0}")]
    Run(String),

    #[error("cancel failed: {0}")]
    Cancel(String),

    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(String),
}

impl BackendError {
    pub fn not_implemented(backend: &'static str, operation: &'static str) -> Self {
        BackendError::NotImplemented { backend, operation }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BackendError::NotImplemented { .. } => "not_implemented",
            BackendError::WarmUp(_) => "warm_up_failed",
            BackendError::Run(_) => "run_failed",
            BackendError::Cancel(_) => "cancel_failed",
            BackendError::InvalidConfig(_) => "invalid_config",
            BackendError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e.to_string())
    }
}
