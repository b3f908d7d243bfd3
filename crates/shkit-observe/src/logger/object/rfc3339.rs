use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::object::timezone::get_or_detect_local_offset;

/// RFC3339 timestamp formatter for the diagnostics subscriber.
///
/// Uses the cached local offset, falling back to UTC.
#[derive(Debug, Clone, Copy)]
pub struct LoggerRfc3339;

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{} ", rfc3339_now())
    }
}

/// Current time as an RFC3339 string in the cached local offset.
///
/// Shared by the diagnostics subscriber and the log-file sink so both carry the same clock.
pub fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .to_offset(get_or_detect_local_offset())
        .format(&Rfc3339)
        .unwrap_or_else(|_| "<invalid-time>".to_string())
}
