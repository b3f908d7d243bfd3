mod file;
pub use file::FileSink;

mod memory;
pub use memory::MemorySink;

mod stderr;
pub use stderr::StderrSink;

mod syslog;
pub use syslog::SyslogSink;

use thiserror::Error;

use crate::severity::record::LogRecord;

/// Failure to deliver one line to one sink. Never fatal.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink state poisoned")]
    Poisoned,
}

/// Destination for log records.
///
/// `write` is called once per line of a record. Implementations must not panic;
/// errors are reported back to the logger, which keeps going with the other sinks.
pub trait Sink: Send + Sync {
    /// Sink name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Deliver one line of `record`.
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError>;
}
