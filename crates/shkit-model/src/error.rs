use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("unknown in-flight policy: {0} (expected: detach|kill)")]
    UnknownInFlightPolicy(String),

    #[error("invalid concurrency limit: {0} (expected a positive integer)")]
    InvalidConcurrency(String),

    #[error("command template is empty")]
    EmptyTemplate,
}

pub type ModelResult<T> = Result<T, ModelError>;
