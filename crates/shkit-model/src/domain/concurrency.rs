use std::{fmt, num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::DEFAULT_CONCURRENCY,
    error::{ModelError, ModelResult},
};

/// Upper bound on simultaneously running jobs.
///
/// Always positive. Parsing rejects zero, negative and non-numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    /// Create a limit; `None` if `n` is zero.
    pub const fn new(n: usize) -> Option<Self> {
        match NonZeroUsize::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Limit as a plain integer.
    #[inline]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY).unwrap_or(Self(NonZeroUsize::MIN))
    }
}

impl FromStr for Concurrency {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ModelError::InvalidConcurrency(s.to_string()))
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = ModelError;
    fn try_from(n: usize) -> ModelResult<Self> {
        Self::new(n).ok_or_else(|| ModelError::InvalidConcurrency(n.to_string()))
    }
}

impl From<Concurrency> for usize {
    fn from(c: Concurrency) -> Self {
        c.get()
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
