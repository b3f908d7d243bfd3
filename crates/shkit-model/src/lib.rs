mod domain;
pub use domain::{Concurrency, LogSeverity};
pub use domain::{DEFAULT_CONCURRENCY, DEFAULT_POLL_INTERVAL_MS, DEFAULT_QUIT_CODE, DEFAULT_SHELL};

mod error;
pub use error::{ModelError, ModelResult};

mod job;
pub use job::{CommandTemplate, JobInvocation};

mod strategy;
pub use strategy::InFlightPolicy;
