use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    logger::{LoggerError, rfc3339_now},
    severity::{
        record::LogRecord,
        sink::{Sink, SinkError},
    },
};

/// Append-only log file.
///
/// Each line is written as `<rfc3339> [SEVERITY] [identity] [operation] line`
/// with a single `write_all`, so concurrent appenders do not interleave within a line.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::LogFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let entry = format!(
            "{} [{}] {} {}\n",
            rfc3339_now(),
            record.severity(),
            record.tag(),
            line
        );
        let mut file = self.file.lock().map_err(|_| SinkError::Poisoned)?;
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::record::SourceTag;
    use shkit_model::LogSeverity;

    #[test]
    fn appends_prefixed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.log");
        std::fs::write(&path, "existing\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        let tag = SourceTag::new("backup").with_operation("rotate");
        let record = LogRecord::new(LogSeverity::Warn, "disk low", tag);
        sink.write(&record, "disk low").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "existing");
        assert!(
            lines[1].ends_with(" [WARN] [backup] [rotate] disk low"),
            "unexpected line: {}",
            lines[1]
        );
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.log");
        assert!(matches!(
            FileSink::open(&path),
            Err(LoggerError::LogFile { .. })
        ));
    }
}
