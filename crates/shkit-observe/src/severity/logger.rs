use std::{fmt, sync::Arc};

use shkit_model::LogSeverity;
use tracing::debug;

use crate::severity::{
    record::{LogRecord, SourceTag},
    sink::Sink,
    threshold::LogThreshold,
};

/// Severity-filtered logger fanning records out to a set of sinks.
///
/// Cheap to clone: clones share the threshold and the sinks. A logger is one of the
/// pieces of a process-scoped context; nothing here is global, so several loggers can
/// coexist (e.g. in tests).
#[derive(Clone)]
pub struct SeverityLogger {
    tag: SourceTag,
    threshold: LogThreshold,
    sinks: Arc<Vec<Arc<dyn Sink>>>,
}

impl SeverityLogger {
    /// Logger without sinks. Add them with [`SeverityLogger::with_sink`].
    pub fn new(identity: impl Into<Arc<str>>, threshold: LogThreshold) -> Self {
        Self {
            tag: SourceTag::new(identity),
            threshold,
            sinks: Arc::new(Vec::new()),
        }
    }

    /// Add a sink and return the updated logger.
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        Arc::make_mut(&mut self.sinks).push(sink);
        self
    }

    /// Logger sharing threshold and sinks, tagged with another operation name.
    pub fn with_operation(&self, operation: impl Into<Arc<str>>) -> Self {
        Self {
            tag: self.tag.with_operation(operation),
            threshold: self.threshold.clone(),
            sinks: Arc::clone(&self.sinks),
        }
    }

    pub fn tag(&self) -> &SourceTag {
        &self.tag
    }

    pub fn threshold(&self) -> &LogThreshold {
        &self.threshold
    }

    /// Filter and deliver a record.
    ///
    /// Returns `true` if the record passed the threshold. Sink failures are reported
    /// through `tracing` and otherwise ignored; every sink gets every line.
    pub fn emit(&self, severity: LogSeverity, message: impl Into<String>) -> bool {
        if !self.threshold.admits(severity) {
            return false;
        }
        let record = LogRecord::new(severity, message, self.tag.clone());
        for sink in self.sinks.iter() {
            for line in record.lines() {
                if let Err(e) = sink.write(&record, line) {
                    debug!(sink = sink.name(), error = %e, "log sink write failed");
                }
            }
        }
        true
    }

    pub fn emergency(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Emergency, message)
    }

    pub fn alert(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Alert, message)
    }

    pub fn critical(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Critical, message)
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Error, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Warn, message)
    }

    pub fn notice(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Notice, message)
    }

    pub fn info(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Info, message)
    }

    pub fn debug(&self, message: impl Into<String>) -> bool {
        self.emit(LogSeverity::Debug, message)
    }
}

impl fmt::Debug for SeverityLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeverityLogger")
            .field("tag", &self.tag)
            .field("threshold", &self.threshold.get())
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::sink::{MemorySink, SinkError};

    struct FailingSink;

    impl Sink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn write(&self, _record: &LogRecord, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("disk full")))
        }
    }

    fn logger_with_memory(threshold: LogSeverity) -> (SeverityLogger, Arc<MemorySink>) {
        let mem = Arc::new(MemorySink::new());
        let logger =
            SeverityLogger::new("test", LogThreshold::new(threshold)).with_sink(mem.clone());
        (logger, mem)
    }

    #[test]
    fn emits_iff_at_least_as_severe_as_threshold() {
        for threshold in LogSeverity::ALL {
            for severity in LogSeverity::ALL {
                let (logger, mem) = logger_with_memory(threshold);
                let emitted = logger.emit(severity, "msg");

                assert_eq!(emitted, severity.rank() <= threshold.rank());
                assert_eq!(mem.lines().len(), usize::from(emitted));
            }
        }
    }

    #[test]
    fn warn_threshold_drops_debug_keeps_error() {
        let (logger, mem) = logger_with_memory(LogSeverity::Warn);

        assert!(!logger.debug("noise"));
        assert!(logger.error("real problem"));
        assert_eq!(mem.entries(), vec![(LogSeverity::Error, "real problem".to_string())]);
    }

    #[test]
    fn threshold_changes_apply_immediately() {
        let (logger, mem) = logger_with_memory(LogSeverity::Info);
        logger.debug("hidden");
        logger.threshold().set(LogSeverity::Debug);
        logger.debug("shown");

        assert_eq!(mem.lines(), vec!["shown"]);
    }

    #[test]
    fn multi_line_messages_are_split() {
        let (logger, mem) = logger_with_memory(LogSeverity::Info);
        logger.info("first\nsecond");
        assert_eq!(mem.lines(), vec!["first", "second"]);
    }

    #[test]
    fn failing_sink_does_not_block_others() {
        let mem = Arc::new(MemorySink::new());
        let logger = SeverityLogger::new("test", LogThreshold::default())
            .with_sink(Arc::new(FailingSink))
            .with_sink(mem.clone());

        assert!(logger.warn("still delivered"));
        assert_eq!(mem.lines(), vec!["still delivered"]);
    }

    #[test]
    fn with_operation_shares_sinks_and_threshold() {
        let (logger, mem) = logger_with_memory(LogSeverity::Info);
        let job = logger.with_operation("job-1");

        assert_eq!(job.tag().operation(), Some("job-1"));
        job.threshold().set(LogSeverity::Debug);
        assert!(logger.debug("parent sees new threshold"));
        job.info("from job");

        assert!(mem.contains("from job"));
        assert_eq!(logger.tag().operation(), None);
    }

    #[test]
    fn convenience_wrappers_use_their_severity() {
        let (logger, mem) = logger_with_memory(LogSeverity::Debug);
        logger.emergency("a");
        logger.alert("b");
        logger.critical("c");
        logger.error("d");
        logger.warn("e");
        logger.notice("f");
        logger.info("g");
        logger.debug("h");

        let severities: Vec<LogSeverity> = mem.entries().into_iter().map(|(s, _)| s).collect();
        assert_eq!(severities, LogSeverity::ALL.to_vec());
    }
}
