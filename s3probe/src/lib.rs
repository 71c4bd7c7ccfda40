//! # s3probe
//!
//! A health probe for S3-compatible object storage endpoints.
//!
//! A probe run executes a fixed chain of checks against one endpoint:
//!
//! - **List**: the endpoint answers a listing request
//! - **Put**: a small payload file can be uploaded
//! - **Get**: the uploaded object downloads byte-for-byte
//! - **Del**: the uploaded object can be deleted
//!
//! Each check depends on its predecessor and is skipped with a WARNING when
//! the predecessor did not pass. The results are folded into a single
//! OK / WARNING / CRITICAL verdict.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use s3probe::prelude::*;
//!
//! let config = ProbeConfig::new()
//!     .with_endpoint("https://s3.example.org")
//!     .with_credentials("access", "secret")
//!     .with_bucket("probe");
//! let gateway = ObjectStoreGateway::connect(&config)?;
//!
//! let pipeline = PipelineBuilder::storage_probe()?.build()?;
//! let report = pipeline.run(&config, &gateway).await?;
//! println!("{report}");
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ProbeConfig;
    pub use crate::core::{ProbeStatus, ResultLog, StageOutcome, StageResult, Verdict};
    pub use crate::errors::{
        ConfigurationError, GatewayError, PipelineValidationError, ProbeError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::gateway::{ObjectStoreGateway, StorageGateway, UnavailableGateway};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{Aggregator, MetricPipeline, PipelineBuilder, StageSpec};
    pub use crate::report::ProbeReport;
    pub use crate::stages::{Stage, StageContext};
}
