use std::path::PathBuf;

use shkit_model::{DEFAULT_QUIT_CODE, LogSeverity};
use shkit_observe::SeverityLogger;

use crate::{
    cleanup::CleanupStack,
    coordinator::Termination,
    error::ScriptError,
    guard::{ProcessLock, default_lock_path},
};

/// Process-scoped state shared by every component of a script.
///
/// Carries the script identity, the severity logger (and through it the shared
/// threshold), and the cleanup stack. Cheap to clone; clones share all three.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    logger: SeverityLogger,
    cleanup: CleanupStack,
}

impl ScriptContext {
    /// Context with a fresh cleanup stack. The identity is taken from the logger.
    pub fn new(logger: SeverityLogger) -> Self {
        Self {
            logger,
            cleanup: CleanupStack::new(),
        }
    }

    pub fn identity(&self) -> &str {
        self.logger.tag().identity()
    }

    pub fn logger(&self) -> &SeverityLogger {
        &self.logger
    }

    pub fn cleanup(&self) -> &CleanupStack {
        &self.cleanup
    }

    /// Log `message` at `severity` and describe the resulting termination with `code`.
    ///
    /// The returned value is handed back to the coordinator (usually via `Err`), which
    /// runs the cleanup stack and exits with `code`.
    pub fn quit_with(&self, severity: LogSeverity, message: impl Into<String>, code: u8) -> Termination {
        let message = message.into();
        self.logger.emit(severity, message.as_str());
        Termination::new(severity, message, code)
    }

    /// [`ScriptContext::quit_with`] using the default exit code 3.
    pub fn quit(&self, severity: LogSeverity, message: impl Into<String>) -> Termination {
        self.quit_with(severity, message, DEFAULT_QUIT_CODE)
    }

    /// Report a fatal script error at its taxonomy severity.
    pub fn fail(&self, err: ScriptError) -> Termination {
        self.quit(err.severity(), err.to_string())
    }

    /// Value of a required environment variable; unset or empty is a configuration error.
    pub fn require_env(&self, key: &str) -> Result<String, Termination> {
        match std::env::var(key) {
            Ok(v) if !v.is_empty() => Ok(v),
            _ => Err(self.fail(ScriptError::Configuration(format!(
                "required environment variable {key} is not set"
            )))),
        }
    }

    /// Enforce single-instance execution for this script.
    ///
    /// `path` defaults to `<temp-dir>/<identity>.pid`. On success the marker removal is
    /// already registered with the cleanup stack.
    pub fn check_pid(&self, path: Option<PathBuf>) -> Result<ProcessLock, Termination> {
        let path = path.unwrap_or_else(|| default_lock_path(self.identity()));
        ProcessLock::acquire(&path, std::process::id(), &self.cleanup).map_err(|e| self.fail(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shkit_observe::{LogThreshold, MemorySink};
    use std::sync::Arc;

    fn context() -> (ScriptContext, Arc<MemorySink>) {
        let mem = Arc::new(MemorySink::new());
        let logger = SeverityLogger::new("ctx-test", LogThreshold::new(LogSeverity::Debug))
            .with_sink(mem.clone());
        (ScriptContext::new(logger), mem)
    }

    #[test]
    fn quit_logs_then_returns_termination() {
        let (ctx, mem) = context();
        let t = ctx.quit_with(LogSeverity::Critical, "out of space", 7);

        assert_eq!(t.code(), 7);
        assert_eq!(t.severity(), LogSeverity::Critical);
        assert_eq!(mem.entries(), vec![(LogSeverity::Critical, "out of space".to_string())]);
    }

    #[test]
    fn quit_defaults_to_exit_three() {
        let (ctx, _) = context();
        assert_eq!(ctx.quit(LogSeverity::Error, "x").code(), 3);
    }

    #[test]
    fn missing_env_is_configuration_error_at_error_severity() {
        let (ctx, mem) = context();
        let t = ctx
            .require_env("SHKIT_TEST_SURELY_UNSET_VARIABLE")
            .unwrap_err();

        assert_eq!(t.severity(), LogSeverity::Error);
        assert_eq!(t.code(), 3);
        assert!(mem.contains("SHKIT_TEST_SURELY_UNSET_VARIABLE is not set"));
    }

    #[test]
    fn present_env_is_returned() {
        let (ctx, _) = context();
        assert!(ctx.require_env("PATH").is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn check_pid_against_live_owner_quits_at_warn() {
        let (ctx, mem) = context();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.pid");
        // pid 1 is always alive on unix.
        std::fs::write(&path, "1").unwrap();

        let t = ctx.check_pid(Some(path.clone())).unwrap_err();
        assert_eq!(t.severity(), LogSeverity::Warn);
        assert!(mem.contains("already running"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1");
    }

    #[test]
    #[cfg(unix)]
    fn check_pid_registers_marker_removal() {
        let (ctx, _) = context();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.pid");

        let lock = ctx.check_pid(Some(path.clone())).unwrap();
        assert_eq!(lock.owner_pid(), std::process::id());
        assert_eq!(ctx.cleanup().len(), 1);

        ctx.cleanup().drain(ctx.logger());
        assert!(!path.exists());
    }
}
