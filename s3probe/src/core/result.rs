//! Stage results and the append-only result log.

use super::ProbeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a stage body reports back before it is stamped into a [`StageResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// Outcome status.
    pub status: ProbeStatus,
    /// Human-readable summary.
    pub summary: String,
}

impl StageOutcome {
    /// Creates an OK outcome.
    #[must_use]
    pub fn ok(summary: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Ok,
            summary: summary.into(),
        }
    }

    /// Creates a WARNING outcome.
    #[must_use]
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Warning,
            summary: summary.into(),
        }
    }

    /// Creates a CRITICAL outcome.
    #[must_use]
    pub fn critical(summary: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Critical,
            summary: summary.into(),
        }
    }
}

/// Recorded outcome of one executed (or skipped) stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name.
    pub name: String,
    /// Stage status.
    pub status: ProbeStatus,
    /// Human-readable summary.
    pub summary: String,
    /// When the result was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Time spent in the stage, zero for skipped stages.
    #[serde(default)]
    pub duration_ms: f64,
}

impl StageResult {
    /// Creates a new stage result.
    #[must_use]
    pub fn new(name: impl Into<String>, status: ProbeStatus, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            summary: summary.into(),
            recorded_at: Utc::now(),
            duration_ms: 0.0,
        }
    }

    /// Stamps a stage outcome with the stage name.
    #[must_use]
    pub fn from_outcome(name: impl Into<String>, outcome: StageOutcome) -> Self {
        Self::new(name, outcome.status, outcome.summary)
    }

    /// Sets the measured duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Ordered, append-only record of stage results for one run.
///
/// Insertion order is execution order. Entries are never modified or removed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResultLog {
    entries: Vec<StageResult>,
}

impl ResultLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result.
    pub fn record(&mut self, result: StageResult) {
        self.entries.push(result);
    }

    /// Returns the most recent result recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StageResult> {
        self.entries.iter().rev().find(|r| r.name == name)
    }

    /// Returns the status recorded under `name`.
    #[must_use]
    pub fn status_of(&self, name: &str) -> Option<ProbeStatus> {
        self.get(name).map(|r| r.status)
    }

    /// Returns the result at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&StageResult> {
        self.entries.get(index)
    }

    /// Returns all results in execution order.
    #[must_use]
    pub fn entries(&self) -> &[StageResult] {
        &self.entries
    }

    /// Iterates over recorded statuses in execution order.
    pub fn statuses(&self) -> impl Iterator<Item = ProbeStatus> + '_ {
        self.entries.iter().map(|r| r.status)
    }

    /// Returns the number of recorded results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the log, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<StageResult> {
        self.entries
    }
}
