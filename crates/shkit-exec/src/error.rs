use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid runner configuration: {0}")]
    InvalidRunnerConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Dispatch stopped before the queue was exhausted.
    #[error("cancelled after dispatching {dispatched} of {queued} jobs ({completed} completed)")]
    Cancelled {
        queued: usize,
        dispatched: usize,
        completed: usize,
    },
}
