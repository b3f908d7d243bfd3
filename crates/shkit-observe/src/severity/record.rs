use std::{fmt, sync::Arc};

use shkit_model::LogSeverity;

/// Origin of a record: the script identity plus the operation currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    identity: Arc<str>,
    operation: Option<Arc<str>>,
}

impl SourceTag {
    pub fn new(identity: impl Into<Arc<str>>) -> Self {
        Self {
            identity: identity.into(),
            operation: None,
        }
    }

    /// Same identity, different operation.
    pub fn with_operation(&self, operation: impl Into<Arc<str>>) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            operation: Some(operation.into()),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }
}

/// Renders as `[identity] [operation]`, or `[identity]` without an operation.
impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.identity)?;
        if let Some(op) = &self.operation {
            write!(f, " [{op}]")?;
        }
        Ok(())
    }
}

/// Immutable log record handed to the sinks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    severity: LogSeverity,
    message: String,
    tag: SourceTag,
}

impl LogRecord {
    pub fn new(severity: LogSeverity, message: impl Into<String>, tag: SourceTag) -> Self {
        Self {
            severity,
            message: message.into(),
            tag,
        }
    }

    pub fn severity(&self) -> LogSeverity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tag(&self) -> &SourceTag {
        &self.tag
    }

    /// Message split on line boundaries. An empty message still yields one empty line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        let empty = self.message.is_empty();
        std::iter::once("")
            .filter(move |_| empty)
            .chain(self.message.lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_display_includes_operation_when_set() {
        let tag = SourceTag::new("backup");
        assert_eq!(tag.to_string(), "[backup]");
        assert_eq!(tag.with_operation("rotate").to_string(), "[backup] [rotate]");
        assert_eq!(tag.operation(), None);
    }

    #[test]
    fn lines_split_multi_line_messages() {
        let r = LogRecord::new(LogSeverity::Info, "one\ntwo\r\nthree\n", SourceTag::new("s"));
        assert_eq!(r.lines().collect::<Vec<_>>(), vec!["one", "two", "three"]);
    }

    #[test]
    fn empty_message_is_one_empty_line() {
        let r = LogRecord::new(LogSeverity::Info, "", SourceTag::new("s"));
        assert_eq!(r.lines().collect::<Vec<_>>(), vec![""]);
    }
}
