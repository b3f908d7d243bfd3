use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use shkit_model::LogSeverity;

use crate::{
    logger::{LoggerError, LoggerResult},
    severity::{
        logger::SeverityLogger,
        sink::{FileSink, StderrSink, SyslogSink},
        threshold::LogThreshold,
    },
};

/// Environment variable holding the threshold (`info`, `debug`, `warn`, `3`, …).
pub const ENV_LOG_LEVEL: &str = "SHKIT_LOG_LEVEL";
/// Environment variable holding the log file path.
pub const ENV_LOG_FILE: &str = "SHKIT_LOG_FILE";
/// Environment variable enabling the system log sink (`1`, `true`, `yes`, `on`).
pub const ENV_SYSLOG: &str = "SHKIT_SYSLOG";

/// Configuration of the severity logger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    /// Minimum severity that is emitted.
    pub threshold: LogSeverity,
    /// Optional append-only log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Whether records also go to the system log.
    pub syslog: bool,
}

impl SeverityConfig {
    /// Read the configuration from `SHKIT_LOG_LEVEL`, `SHKIT_LOG_FILE` and `SHKIT_SYSLOG`.
    ///
    /// Unset variables keep their defaults; malformed ones are rejected.
    pub fn from_env() -> LoggerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LoggerResult<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            cfg.threshold = raw.parse().map_err(|_| LoggerError::InvalidEnv {
                key: ENV_LOG_LEVEL,
                value: raw.clone(),
            })?;
        }
        if let Some(path) = lookup(ENV_LOG_FILE).filter(|v| !v.trim().is_empty()) {
            cfg.log_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_SYSLOG) {
            cfg.syslog = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(LoggerError::InvalidEnv {
                        key: ENV_SYSLOG,
                        value: raw,
                    });
                }
            };
        }
        Ok(cfg)
    }

    /// Build a logger for `identity`.
    ///
    /// Standard error is always a sink; the file and system log sinks are added when
    /// configured. Failing to open the log file is an error.
    pub fn build(&self, identity: &str) -> LoggerResult<SeverityLogger> {
        let mut logger = SeverityLogger::new(identity, LogThreshold::new(self.threshold))
            .with_sink(Arc::new(StderrSink));

        if let Some(path) = &self.log_file {
            logger = logger.with_sink(Arc::new(FileSink::open(path)?));
        }
        if self.syslog {
            logger = logger.with_sink(Arc::new(SyslogSink::new()?));
        }
        Ok(logger)
    }
}
