//! Internal diagnostics.
//!
//! Every shkit crate reports its own behaviour through `tracing` macros. This module
//! installs the global subscriber that renders them. It is independent from the
//! user-facing [`crate::SeverityLogger`], which writes script records to its own sinks.
mod config;
mod error;
mod init;
mod object;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::LoggerFormat;
pub use object::LoggerLevel;
pub use object::{LoggerTimeZone, init_local_offset, rfc3339_now};

/// Initializes the global tracing subscriber with the given configuration.
///
/// Diagnostics are always written to stderr so that stdout stays free for the
/// program that embeds shkit.
///
/// # Important: Local Timezone
/// With `LoggerTimeZone::Local` this detects the local offset, so it **must** run
/// in `main()` before spawning any threads (see [`init_local_offset`]).
///
/// # Examples
/// ```rust
/// use shkit_observe::{LoggerConfig, init_logger};
///
/// fn main() {
///     let config = LoggerConfig::default();
///     init_logger(&config).expect("Failed to initialize logger");
///
///     tracing::warn!("Logger initialized successfully");
/// }
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    if cfg.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    init::install(cfg)
}
