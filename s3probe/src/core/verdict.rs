//! Aggregated probe verdict.

use super::{ProbeStatus, ResultLog};
use serde::{Deserialize, Serialize};

/// Summary used when every stage passed.
pub const ALL_FINE: &str = "All fine";
/// Summary used when any stage was critical.
pub const CRITICAL_ERROR: &str = "Critical error executing tests";
/// Summary used when stages only warned.
pub const SOME_WARNINGS: &str = "Some of the tests returned a warning";

/// The overall outcome of a probe run, derived from a [`ResultLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Overall status.
    pub status: ProbeStatus,
    /// Overall summary.
    pub summary: String,
}

impl Verdict {
    /// Computes the verdict for a set of recorded results.
    ///
    /// All OK wins first, then any CRITICAL, otherwise WARNING.
    #[must_use]
    pub fn from_log(log: &ResultLog) -> Self {
        let mut statuses = log.statuses();
        if statuses.all(ProbeStatus::is_ok) {
            return Self::new(ProbeStatus::Ok, ALL_FINE);
        }
        if log.statuses().any(ProbeStatus::is_critical) {
            return Self::new(ProbeStatus::Critical, CRITICAL_ERROR);
        }
        Self::new(ProbeStatus::Warning, SOME_WARNINGS)
    }

    /// Creates a verdict.
    #[must_use]
    pub fn new(status: ProbeStatus, summary: impl Into<String>) -> Self {
        Self {
            status,
            summary: summary.into(),
        }
    }
}
