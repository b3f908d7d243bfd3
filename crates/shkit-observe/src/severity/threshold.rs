use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use shkit_model::LogSeverity;

/// Shared, mutable minimum severity.
///
/// Clones observe the same value, so a verbosity flag flipped through one handle
/// applies to every logger derived from the same context.
#[derive(Debug, Clone)]
pub struct LogThreshold(Arc<AtomicU8>);

impl LogThreshold {
    pub fn new(severity: LogSeverity) -> Self {
        Self(Arc::new(AtomicU8::new(severity.rank())))
    }

    /// Current threshold.
    pub fn get(&self) -> LogSeverity {
        LogSeverity::from_rank(self.0.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Replace the threshold for every handle sharing it.
    pub fn set(&self, severity: LogSeverity) {
        self.0.store(severity.rank(), Ordering::Relaxed);
    }

    /// Returns `true` if a record of `severity` should be emitted.
    #[inline]
    pub fn admits(&self, severity: LogSeverity) -> bool {
        severity.passes(self.get())
    }
}

impl Default for LogThreshold {
    fn default() -> Self {
        Self::new(LogSeverity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_info() {
        let t = LogThreshold::default();
        assert_eq!(t.get(), LogSeverity::Info);
        assert!(t.admits(LogSeverity::Notice));
        assert!(!t.admits(LogSeverity::Debug));
    }

    #[test]
    fn clones_share_updates() {
        let a = LogThreshold::new(LogSeverity::Warn);
        let b = a.clone();

        b.set(LogSeverity::Debug);
        assert_eq!(a.get(), LogSeverity::Debug);
        assert!(a.admits(LogSeverity::Debug));
    }

    #[test]
    fn separate_thresholds_are_independent() {
        let a = LogThreshold::new(LogSeverity::Error);
        let b = LogThreshold::new(LogSeverity::Error);
        a.set(LogSeverity::Debug);
        assert_eq!(b.get(), LogSeverity::Error);
    }
}
