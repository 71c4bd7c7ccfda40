//! Test assertions for probe reports.

use crate::core::ProbeStatus;
use crate::report::ProbeReport;

/// Asserts that the stage `name` was recorded with `expected` status.
pub fn assert_stage_status(report: &ProbeReport, name: &str, expected: ProbeStatus) {
    let result = report
        .result(name)
        .unwrap_or_else(|| panic!("No result recorded for stage '{name}'"));
    assert_eq!(
        result.status, expected,
        "Expected stage '{}' to be {:?}, got {:?} ({})",
        name, expected, result.status, result.summary
    );
}

/// Asserts both status and summary of the stage `name`.
pub fn assert_stage(report: &ProbeReport, name: &str, expected: ProbeStatus, summary: &str) {
    assert_stage_status(report, name, expected);
    let actual = report.result(name).map(|r| r.summary.as_str());
    assert_eq!(
        actual,
        Some(summary),
        "Unexpected summary for stage '{name}'"
    );
}

/// Asserts the overall verdict.
pub fn assert_verdict(report: &ProbeReport, expected: ProbeStatus, summary: &str) {
    assert_eq!(
        (report.verdict.status, report.verdict.summary.as_str()),
        (expected, summary),
        "Unexpected verdict"
    );
}
