use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Settings for the diagnostics subscriber installed by [`crate::init_logger`].
///
/// Missing fields fall back to their defaults when deserialized, so a partial
/// document such as `{"level": "shkit_exec=trace"}` is a complete configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives; `warn` unless overridden.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Print the emitting module next to each event.
    pub with_targets: bool,
    /// Allow ANSI colors in text output. Ignored when stderr is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::Utc,
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Diagnostics for a command-line program: given filter and format, other fields default.
    pub fn with_filter(format: LoggerFormat, level: LoggerLevel) -> Self {
        Self {
            format,
            level,
            ..Self::default()
        }
    }

    /// Colors are used only if enabled and stderr is attached to a terminal.
    ///
    /// Evaluated when the subscriber is installed, not when the config is parsed.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }
}
