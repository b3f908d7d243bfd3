use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{ModelError, ModelResult};

/// Defines what cancellation does to jobs that were already dispatched.
///
/// Cancellation always stops new dispatches. The policy only decides the fate of jobs
/// whose processes are running at that moment.
///
/// Strategies:
/// - `Detach`: leave running processes alone; they finish on their own.
/// - `Kill`: terminate every running job process before the runner returns.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InFlightPolicy {
    /// Stop dispatching; do not touch running jobs.
    #[default]
    Detach,
    /// Stop dispatching and kill running jobs.
    Kill,
}

impl FromStr for InFlightPolicy {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detach" | "leave" | "" => Ok(InFlightPolicy::Detach),
            "kill" | "terminate" => Ok(InFlightPolicy::Kill),
            other => Err(ModelError::UnknownInFlightPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for InFlightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InFlightPolicy::Detach => "detach",
            InFlightPolicy::Kill => "kill",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_detach() {
        assert_eq!(InFlightPolicy::default(), InFlightPolicy::Detach);
    }

    #[test]
    fn parses_known_values() {
        assert_eq!("kill".parse::<InFlightPolicy>().unwrap(), InFlightPolicy::Kill);
        assert_eq!("DETACH".parse::<InFlightPolicy>().unwrap(), InFlightPolicy::Detach);
        assert!(matches!(
            "pause".parse::<InFlightPolicy>(),
            Err(ModelError::UnknownInFlightPolicy(_))
        ));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for p in [InFlightPolicy::Detach, InFlightPolicy::Kill] {
            assert_eq!(p.to_string().parse::<InFlightPolicy>().unwrap(), p);
        }
    }
}
