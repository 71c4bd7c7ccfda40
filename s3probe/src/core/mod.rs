//! Core domain model types for s3probe.
//!
//! This module contains the fundamental types shared by the pipeline:
//! - The three-level probe status
//! - Recorded stage results and the append-only result log
//! - The aggregated verdict

mod result;
mod status;
mod verdict;

pub use result::{ResultLog, StageOutcome, StageResult};
pub use status::ProbeStatus;
pub use verdict::Verdict;
