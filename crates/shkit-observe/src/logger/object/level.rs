use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Filter used when none is configured: diagnostics stay quiet unless something is wrong.
const DEFAULT_FILTER: &str = "warn";

/// Validated `tracing_subscriber::EnvFilter` expression for internal diagnostics.
///
/// Stores the raw string (e.g. `"warn"`, `"shkit_exec=trace,shkit_core=debug,warn"`)
/// so it can round-trip through config files, and builds the filter on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Creates a new `LoggerLevel` from a string-like value.
    ///
    /// # Examples
    /// ```
    /// use shkit_observe::LoggerLevel;
    ///
    /// let lvl = LoggerLevel::new("shkit_exec=debug,warn").unwrap();
    /// assert_eq!(lvl.as_str(), "shkit_exec=debug,warn");
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    /// Returns the filter string exactly as configured.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the `EnvFilter` for the subscriber.
    pub fn to_env_filter(&self) -> EnvFilter {
        // Validated in `TryFrom`; fall back to the default rather than panicking.
        EnvFilter::try_new(self.as_str()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self(DEFAULT_FILTER.to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match EnvFilter::try_new(&s) {
            Ok(_) => Ok(LoggerLevel(s)),
            Err(e) => Err(LoggerError::InvalidLevel(format!("{}: {}", s, e))),
        }
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::LoggerLevel;

    #[test]
    fn accepts_plain_and_per_target_filters() {
        for lvl in ["off", "warn", "trace", "shkit_exec=trace,shkit_core=debug,warn"] {
            let parsed = lvl.parse::<LoggerLevel>();
            assert!(parsed.is_ok(), "expected valid filter for {lvl}, got: {parsed:?}");
        }
    }

    #[test]
    fn rejects_unknown_directives() {
        for lvl in ["shkit_exec=loud", "root=warn,sub=xyz"] {
            assert!(
                lvl.parse::<LoggerLevel>().is_err(),
                "expected error for invalid filter {lvl}"
            );
        }
    }

    #[test]
    fn default_is_warn() {
        let lvl = LoggerLevel::default();
        assert_eq!(lvl.as_str(), "warn");
        assert_eq!(lvl.to_string(), "warn");
        let _filter = lvl.to_env_filter();
    }

    #[test]
    fn serde_from_plain_string() {
        let lvl: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(lvl.as_str(), "debug");
        assert_eq!(serde_json::to_string(&lvl).unwrap(), r#""debug""#);
        assert!(serde_json::from_str::<LoggerLevel>(r#""x=nope""#).is_err());
    }
}
