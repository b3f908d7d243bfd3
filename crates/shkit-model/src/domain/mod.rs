mod severity;
pub use severity::LogSeverity;

mod concurrency;
pub use concurrency::Concurrency;

mod constants;
pub use constants::{DEFAULT_CONCURRENCY, DEFAULT_POLL_INTERVAL_MS, DEFAULT_QUIT_CODE, DEFAULT_SHELL};
