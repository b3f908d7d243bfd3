use std::fmt;

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Invocations in the queue when the run started.
    pub queued: usize,
    /// Jobs handed to the shell.
    pub dispatched: usize,
    /// Jobs observed finished, successful or not.
    pub completed: usize,
    /// Largest number of jobs running at the same time.
    pub peak_active: usize,
}

impl RunSummary {
    pub(crate) fn new(queued: usize) -> Self {
        Self {
            queued,
            ..Self::default()
        }
    }

    pub(crate) fn record_dispatch(&mut self, active: usize) {
        self.dispatched += 1;
        self.peak_active = self.peak_active.max(active);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queued={} dispatched={} completed={} peak={}",
            self.queued, self.dispatched, self.completed, self.peak_active
        )
    }
}
