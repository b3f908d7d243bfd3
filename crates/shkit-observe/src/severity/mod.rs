//! User-facing severity logger.
//!
//! Records are filtered against a shared [`LogThreshold`] and fanned out, line by line,
//! to every configured [`Sink`]. Sink failures are reported as diagnostics and never
//! reach the caller.
mod config;
mod logger;
mod record;
mod sink;
mod threshold;

pub use config::{ENV_LOG_FILE, ENV_LOG_LEVEL, ENV_SYSLOG, SeverityConfig};
pub use logger::SeverityLogger;
pub use record::{LogRecord, SourceTag};
pub use sink::{FileSink, MemorySink, Sink, SinkError, StderrSink, SyslogSink};
pub use threshold::LogThreshold;
