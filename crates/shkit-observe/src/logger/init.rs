use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerRfc3339},
};

/// Build the subscriber for `cfg.format` and install it globally.
///
/// Text and JSON events go to stderr with RFC3339 timestamps; journald is Linux only.
pub(crate) fn install(cfg: &LoggerConfig) -> LoggerResult<()> {
    let registry = tracing_subscriber::registry().with(cfg.level.to_env_filter());

    let installed = match cfg.format {
        LoggerFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(LoggerRfc3339)
                    .with_target(cfg.with_targets)
                    .with_ansi(cfg.should_use_color()),
            )
            .try_init(),
        LoggerFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_timer(LoggerRfc3339)
                    .with_target(cfg.with_targets)
                    .with_ansi(false),
            )
            .try_init(),
        #[cfg(target_os = "linux")]
        LoggerFormat::Journald => {
            let journald = tracing_journald::layer()
                .map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;
            registry.with(journald).try_init()
        }
        #[cfg(not(target_os = "linux"))]
        LoggerFormat::Journald => return Err(LoggerError::JournaldNotSupported),
    };
    installed.map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_is_rejected_off_linux() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Journald,
            ..Default::default()
        };
        assert!(matches!(install(&cfg), Err(LoggerError::JournaldNotSupported)));
    }

    #[test]
    fn only_one_subscriber_can_be_installed() {
        let cfg = LoggerConfig {
            use_color: false,
            ..Default::default()
        };

        let _ = install(&cfg);
        assert!(matches!(install(&cfg), Err(LoggerError::AlreadyInitialized)));
    }
}
