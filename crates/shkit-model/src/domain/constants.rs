//! Common model-level constants.
//!
//! Defaults shared by the logger, the coordinator and the job runner.

/// Exit code used by `quit` when the caller does not supply one.
///
/// Applies to explicit fatal errors and to signal-triggered termination alike.
pub const DEFAULT_QUIT_CODE: u8 = 3;

/// Number of jobs the runner keeps in flight when no limit is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Interval between admission checks while the active job set is full.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Shell program used to execute job invocations.
pub const DEFAULT_SHELL: &str = "sh";
