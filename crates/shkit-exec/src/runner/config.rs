use std::time::Duration;

use shkit_model::{
    CommandTemplate, Concurrency, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SHELL, InFlightPolicy,
};
use tracing::trace;

use crate::ExecError;

/// Poll intervals must stay below this so completions are noticed promptly.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration of a [`JobRunner`](super::JobRunner).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of jobs running at once.
    pub concurrency: Concurrency,
    /// Prefix applied to every queued argument.
    pub template: Option<CommandTemplate>,
    /// Shell used to run each invocation (`<shell> -c ...`).
    pub shell: String,
    /// Sleep between checks while the concurrency limit is reached.
    pub poll_interval: Duration,
    /// What happens to running jobs when the run is cancelled.
    pub in_flight: InFlightPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::default(),
            template: None,
            shell: DEFAULT_SHELL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            in_flight: InFlightPolicy::default(),
        }
    }
}

impl RunnerConfig {
    /// Rules:
    /// - `shell` is not blank.
    /// - `poll_interval` is positive and below one second.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.shell.trim().is_empty() {
            return Err(ExecError::InvalidRunnerConfig("shell is empty".into()));
        }
        if self.poll_interval.is_zero() || self.poll_interval >= MAX_POLL_INTERVAL {
            return Err(ExecError::InvalidRunnerConfig(format!(
                "poll interval must be within (0, 1s), got {:?}",
                self.poll_interval
            )));
        }
        Ok(())
    }

    pub fn trace_state(&self) {
        trace!(
            concurrency = self.concurrency.get(),
            template = ?self.template.as_ref().map(CommandTemplate::as_str),
            shell = %self.shell,
            poll_ms = self.poll_interval.as_millis() as u64,
            in_flight = %self.in_flight,
            "runner config resolved"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = RunnerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.concurrency.get(), 8);
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.in_flight, InFlightPolicy::Detach);
    }

    #[test]
    fn rejects_blank_shell() {
        let cfg = RunnerConfig {
            shell: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ExecError::InvalidRunnerConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_poll_interval() {
        for poll in [Duration::ZERO, Duration::from_secs(1), Duration::from_secs(5)] {
            let cfg = RunnerConfig {
                poll_interval: poll,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "{poll:?} accepted");
        }
    }
}
