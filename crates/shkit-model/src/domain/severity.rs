use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ModelError, ModelResult};

/// Severity of a log record, ordered from most to least severe.
///
/// Each variant carries a fixed rank (`0` = `Emergency` … `7` = `Debug`) that matches
/// the syslog priority numbering. Ordering follows the rank, so `Emergency < Debug`:
/// a "smaller" severity is a more severe one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LogSeverity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warn = 4,
    Notice = 5,
    #[default]
    Info = 6,
    Debug = 7,
}

impl LogSeverity {
    /// All severities, most severe first.
    pub const ALL: [LogSeverity; 8] = [
        LogSeverity::Emergency,
        LogSeverity::Alert,
        LogSeverity::Critical,
        LogSeverity::Error,
        LogSeverity::Warn,
        LogSeverity::Notice,
        LogSeverity::Info,
        LogSeverity::Debug,
    ];

    /// Numeric rank, `0` for `Emergency` up to `7` for `Debug`.
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Severity for the given rank, if it is in `0..=7`.
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warn),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// Returns `true` if a record of this severity passes `threshold`,
    /// i.e. it is at least as severe as the threshold.
    #[inline]
    pub const fn passes(self, threshold: LogSeverity) -> bool {
        self.rank() <= threshold.rank()
    }

    /// Canonical upper-case name (`"WARN"`, `"DEBUG"`, …).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl FromStr for LogSeverity {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let norm = s.trim().to_ascii_lowercase();
        if let Ok(rank) = norm.parse::<u8>() {
            return Self::from_rank(rank).ok_or_else(|| ModelError::UnknownSeverity(s.to_string()));
        }
        match norm.as_str() {
            "emergency" | "emerg" | "panic" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" | "crit" => Ok(Self::Critical),
            "error" | "err" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "notice" => Ok(Self::Notice),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(ModelError::UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogSeverity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_str().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for LogSeverity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
