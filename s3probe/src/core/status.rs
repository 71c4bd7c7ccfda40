//! Probe status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a single stage or of a whole probe run.
///
/// Variants are ordered by severity, so `max()` over a set of statuses
/// yields the most severe one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    /// The check passed.
    #[default]
    Ok,
    /// The check was not performed or returned a soft failure.
    Warning,
    /// The check failed.
    Critical,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl ProbeStatus {
    /// Returns the conventional monitoring exit code (0, 1 or 2).
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
        }
    }

    /// Returns true if the status is OK.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if the status is CRITICAL.
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}
