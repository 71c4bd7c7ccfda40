//! Pipeline building and execution.
//!
//! This module provides:
//! - Stage specifications with sequence numbers and dependencies
//! - A validating pipeline builder
//! - The sequential metric pipeline
//! - The terminal aggregator

mod aggregator;
mod builder;
mod runner;
mod spec;

pub use aggregator::Aggregator;
pub use builder::PipelineBuilder;
pub use runner::{MetricPipeline, READ_ONLY};
pub use spec::StageSpec;
