use std::path::PathBuf;

use shkit_model::LogSeverity;
use thiserror::Error;

/// Fatal script errors. Each one ends the process through `quit`.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("already running: {} is held by live process {pid}", path.display())]
    AlreadyRunning { path: PathBuf, pid: u32 },

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(&'static str),
}

impl ScriptError {
    /// Severity the error is reported at.
    pub fn severity(&self) -> LogSeverity {
        match self {
            ScriptError::AlreadyRunning { .. } => LogSeverity::Warn,
            ScriptError::Configuration(_) | ScriptError::UnsupportedPlatform(_) => {
                LogSeverity::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_follow_taxonomy() {
        let running = ScriptError::AlreadyRunning {
            path: PathBuf::from("/tmp/x.pid"),
            pid: 42,
        };
        assert_eq!(running.severity(), LogSeverity::Warn);
        assert_eq!(
            ScriptError::Configuration("USER is not set".into()).severity(),
            LogSeverity::Error
        );
        assert_eq!(
            ScriptError::UnsupportedPlatform("no kill(2)").severity(),
            LogSeverity::Error
        );
    }

    #[test]
    fn already_running_message_names_path_and_pid() {
        let err = ScriptError::AlreadyRunning {
            path: PathBuf::from("/tmp/x.pid"),
            pid: 42,
        };
        assert_eq!(
            err.to_string(),
            "already running: /tmp/x.pid is held by live process 42"
        );
    }
}
