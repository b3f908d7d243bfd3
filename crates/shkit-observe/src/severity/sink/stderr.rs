use std::io::Write;

use crate::severity::{
    record::LogRecord,
    sink::{Sink, SinkError},
};

/// Writes `[SEVERITY] line` to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn name(&self) -> &'static str {
        "stderr"
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "[{}] {}", record.severity(), line)?;
        Ok(())
    }
}
