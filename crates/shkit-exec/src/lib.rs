mod error;
pub use error::ExecError;

mod queue;
pub use queue::JobQueue;

mod job;
pub use job::{JobOutcome, JobState};

mod kill;

mod runner;
pub use runner::{JobRunner, RunSummary, RunnerConfig};
