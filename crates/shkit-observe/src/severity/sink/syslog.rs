use crate::{
    logger::LoggerError,
    severity::{
        record::LogRecord,
        sink::{Sink, SinkError},
    },
};

/// System log via `syslog(3)`, facility `user`.
///
/// The severity rank is passed through unchanged as the syslog priority; the
/// message is tagged `[identity] [operation] [SEVERITY]`.
#[derive(Debug, Clone, Copy)]
pub struct SyslogSink {
    _private: (),
}

impl SyslogSink {
    #[cfg(unix)]
    pub fn new() -> Result<Self, LoggerError> {
        Ok(Self { _private: () })
    }

    #[cfg(not(unix))]
    pub fn new() -> Result<Self, LoggerError> {
        Err(LoggerError::SyslogNotSupported)
    }
}

/// Text handed to syslog for one line of `record`.
fn syslog_message(record: &LogRecord, line: &str) -> String {
    format!("{} [{}] {}", record.tag(), record.severity(), line)
}

impl Sink for SyslogSink {
    fn name(&self) -> &'static str {
        "syslog"
    }

    #[cfg(unix)]
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        use std::ffi::CString;

        let text = syslog_message(record, line).replace('\0', " ");
        let msg = CString::new(text)
            .map_err(|e| SinkError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        let priority = libc::LOG_USER | libc::c_int::from(record.severity().rank());

        // SAFETY: the format string is a static "%s" and `msg` is a valid
        // NUL-terminated C string that outlives the call.
        unsafe {
            libc::syslog(priority, c"%s".as_ptr(), msg.as_ptr());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn write(&self, _record: &LogRecord, _line: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::record::SourceTag;
    use shkit_model::LogSeverity;

    #[test]
    fn message_carries_tag_and_severity() {
        let tag = SourceTag::new("prunner").with_operation("job-3");
        let record = LogRecord::new(LogSeverity::Critical, "boom", tag);
        assert_eq!(
            syslog_message(&record, "boom"),
            "[prunner] [job-3] [CRITICAL] boom"
        );
    }

    #[test]
    #[cfg(unix)]
    fn writing_never_fails_on_unix() {
        let sink = SyslogSink::new().unwrap();
        let record = LogRecord::new(LogSeverity::Debug, "a\0b", SourceTag::new("t"));
        assert!(sink.write(&record, "a\0b").is_ok());
    }
}
