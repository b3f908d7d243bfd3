use std::sync::Mutex;

use shkit_model::LogSeverity;

use crate::severity::{
    record::LogRecord,
    sink::{Sink, SinkError},
};

/// Keeps every delivered line in memory.
///
/// Handy for embedding programs that post-process their own log, and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogSeverity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(severity, line)` pairs in delivery order.
    pub fn entries(&self) -> Vec<(LogSeverity, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Snapshot of the delivered lines only.
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, line)| line).collect()
    }

    /// Returns `true` if any delivered line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, line)| line.contains(needle))
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let mut entries = self.entries.lock().map_err(|_| SinkError::Poisoned)?;
        entries.push((record.severity(), line.to_string()));
        Ok(())
    }
}
