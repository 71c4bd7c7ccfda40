//! Stage trait and implementations.
//!
//! Stages are the individual checks of a probe run. A stage body performs
//! one storage operation and reports a [`StageOutcome`]; any error it
//! returns is turned into a CRITICAL result by the pipeline.

mod storage;

pub use storage::{
    DelStage, GetStage, ListStage, PutStage, DEL, GET, LIST, NO_ENDPOINTS, PUT,
};

use crate::config::ProbeConfig;
use crate::core::{ResultLog, StageOutcome};
use crate::errors::ProbeError;
use crate::gateway::StorageGateway;
use crate::run::{RunObjectStore, Workdir};
use async_trait::async_trait;
use std::fmt::Debug;

/// Everything a stage body may touch during one run.
pub struct StageContext<'a> {
    /// Run configuration.
    pub config: &'a ProbeConfig,
    /// Storage capability.
    pub gateway: &'a dyn StorageGateway,
    /// Objects uploaded so far this run.
    pub objects: &'a mut RunObjectStore,
    /// Scoped working directory.
    pub workdir: &'a Workdir,
    /// Results recorded before this stage.
    pub results: &'a ResultLog,
}

/// Trait for probe stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Runs the stage body.
    ///
    /// Dependency and read-only gating happen before this is called.
    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError>;
}

/// A simple function-based stage.
pub struct FnStage<F>
where
    F: Fn(&StageContext<'_>) -> Result<StageOutcome, ProbeError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&StageContext<'_>) -> Result<StageOutcome, ProbeError> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&StageContext<'_>) -> Result<StageOutcome, ProbeError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&StageContext<'_>) -> Result<StageOutcome, ProbeError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
        (self.func)(ctx)
    }
}
