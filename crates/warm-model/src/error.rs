use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("unknown readiness: {0}")]
    UnknownReadiness(String),

    #[error("invalid test framework: {0}")]
    InvalidFramework(String),

    #[error("invalid strategy selection: {0}")]
    InvalidSelection(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
