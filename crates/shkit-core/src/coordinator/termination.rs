use std::{fmt, process::ExitCode};

use shkit_model::{DEFAULT_QUIT_CODE, LogSeverity};

/// How the process ends.
///
/// Produced by `ScriptContext::quit` after the message has been logged. Explicit
/// errors and signals both end up as a `Termination`, so the coordinator has a single
/// exit path for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    severity: LogSeverity,
    message: String,
    code: u8,
}

impl Termination {
    pub fn new(severity: LogSeverity, message: impl Into<String>, code: u8) -> Self {
        Self {
            severity,
            message: message.into(),
            code,
        }
    }

    /// Termination with the default quit code (3).
    pub fn with_default_code(severity: LogSeverity, message: impl Into<String>) -> Self {
        Self::new(severity, message, DEFAULT_QUIT_CODE)
    }

    pub fn severity(&self) -> LogSeverity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (exit {})", self.severity, self.message, self.code)
    }
}

impl std::error::Error for Termination {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_code_is_three() {
        let t = Termination::with_default_code(LogSeverity::Error, "bad");
        assert_eq!(t.code(), 3);
        assert_eq!(t.to_string(), "[ERROR] bad (exit 3)");
    }
}
