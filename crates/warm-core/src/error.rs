use thiserror::Error;

use warm_model::ModelError;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// `run` was called before any `preload`; a caller contract violation, never retried.
    #[error("RunStrategy::preload has not been invoked")]
    PreloadNotInvoked,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("unknown strategy variant: {0}")]
    UnknownVariant(String),

    #[error("duplicate strategy variant: '{0}' is already registered")]
    DuplicateVariant(String),

    #[error("invalid payload for event '{event}': expected {expected}")]
    InvalidPayload {
        event: String,
        expected: &'static str,
    },

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns a short stable label (snake_case) for use in logs and fatal reports.
    pub fn as_label(&self) -> &'static str {
        match self {
            CoreError::PreloadNotInvoked => "preload_not_invoked",
            CoreError::Backend(e) => e.as_label(),
            CoreError::UnknownVariant(_) => "unknown_variant",
            CoreError::DuplicateVariant(_) => "duplicate_variant",
            CoreError::InvalidPayload { .. } => "invalid_payload",
            CoreError::Model(_) => "invalid_model",
            CoreError::Io(_) => "io",
            CoreError::Internal(_) => "internal",
        }
    }
}
