//! Terminal aggregation step.

use crate::core::{ResultLog, Verdict};
use crate::run::Workdir;
use tracing::info;

/// Computes the overall verdict and releases run-scoped resources.
#[derive(Debug, Clone)]
pub struct Aggregator {
    name: String,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new("All")
    }
}

impl Aggregator {
    /// Creates an aggregator reported under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the aggregator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Computes the verdict without side effects.
    #[must_use]
    pub fn aggregate(&self, log: &ResultLog) -> Verdict {
        Verdict::from_log(log)
    }

    /// Computes the verdict, then releases the working directory.
    ///
    /// Release is best effort and never affects the verdict.
    pub fn finish(&self, log: &ResultLog, workdir: &mut Workdir) -> Verdict {
        let verdict = self.aggregate(log);
        workdir.release();
        info!(
            aggregator = %self.name,
            status = %verdict.status,
            summary = %verdict.summary,
            stages = log.len(),
            "Probe verdict computed"
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProbeStatus, StageResult};

    #[test]
    fn test_finish_releases_workdir() {
        let mut log = ResultLog::new();
        log.record(StageResult::new("List", ProbeStatus::Critical, "down"));
        let mut workdir = Workdir::create().unwrap();
        let path = workdir.path().to_path_buf();

        let verdict = Aggregator::default().finish(&log, &mut workdir);

        assert_eq!(verdict.status, ProbeStatus::Critical);
        assert!(!path.exists());
    }

    #[test]
    fn test_finish_twice_is_safe() {
        let log = ResultLog::new();
        let mut workdir = Workdir::create().unwrap();
        let aggregator = Aggregator::default();

        let first = aggregator.finish(&log, &mut workdir);
        let second = aggregator.finish(&log, &mut workdir);

        assert_eq!(first, second);
        assert_eq!(aggregator.name(), "All");
    }
}
