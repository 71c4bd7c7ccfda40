//! Testing utilities for probe pipelines.
//!
//! This module provides:
//! - A recording in-memory storage gateway
//! - Assertions over probe reports

mod assertions;
mod mocks;

pub use assertions::{assert_stage, assert_stage_status, assert_verdict};
pub use mocks::{GatewayCall, MockGateway, Operation};
