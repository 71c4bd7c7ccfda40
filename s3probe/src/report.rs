//! Probe report returned to callers.

use crate::core::{ResultLog, StageResult, Verdict};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The outcome of one probe run: every stage result plus the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// Name of the pipeline that produced the report.
    pub pipeline: String,
    /// Stage results in execution order.
    pub results: Vec<StageResult>,
    /// Aggregated verdict.
    pub verdict: Verdict,
}

impl ProbeReport {
    /// Creates a report from a finished result log.
    #[must_use]
    pub fn new(pipeline: impl Into<String>, log: ResultLog, verdict: Verdict) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline: pipeline.into(),
            results: log.into_entries(),
            verdict,
        }
    }

    /// Returns the result recorded under `name`.
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Process exit code for the verdict.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.verdict.status.exit_code()
    }

    /// Serializes the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.verdict.status, self.verdict.summary)?;
        for result in &self.results {
            writeln!(f, "{}: {} - {}", result.name, result.status, result.summary)?;
        }
        Ok(())
    }
}
