//! Pipeline builder with validation.

use super::{Aggregator, MetricPipeline, StageSpec};
use crate::errors::PipelineValidationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::{DelStage, GetStage, ListStage, PutStage, Stage, GET, LIST, PUT};
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// A stage may only depend on a stage that was added before it and has a
/// lower sequence number, so the dependency graph is acyclic by construction.
#[derive(Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
    aggregator: Aggregator,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            aggregator: Aggregator::default(),
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// The list, write, read and delete chain against one bucket.
    ///
    /// # Errors
    ///
    /// Never fails in practice; validation errors are propagated for uniformity.
    pub fn storage_probe() -> Result<Self, PipelineValidationError> {
        Self::new("s3-probe")
            .stage(1, Arc::new(ListStage), None)?
            .mutating_stage(2, Arc::new(PutStage), Some(LIST))?
            .mutating_stage(3, Arc::new(GetStage), Some(PUT))?
            .mutating_stage(4, Arc::new(DelStage), Some(GET))
    }

    /// Adds a stage.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (duplicate, unknown dependency, etc.)
    pub fn stage(
        mut self,
        sequence: u32,
        runner: Arc<dyn Stage>,
        depends_on: Option<&str>,
    ) -> Result<Self, PipelineValidationError> {
        let mut spec = StageSpec::new(sequence, runner);
        spec.depends_on = depends_on.map(str::to_string);
        self.add_stage_spec(spec)?;
        Ok(self)
    }

    /// Adds a stage that read-only mode suppresses.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn mutating_stage(
        mut self,
        sequence: u32,
        runner: Arc<dyn Stage>,
        depends_on: Option<&str>,
    ) -> Result<Self, PipelineValidationError> {
        let mut spec = StageSpec::new(sequence, runner).mutating();
        spec.depends_on = depends_on.map(str::to_string);
        self.add_stage_spec(spec)?;
        Ok(self)
    }

    /// Adds a stage with a specification.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn add_stage_spec(&mut self, spec: StageSpec) -> Result<(), PipelineValidationError> {
        spec.validate()?;

        if let Some(existing) = self.stages.iter().find(|s| s.name == spec.name) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' is already defined",
                existing.name
            ))
            .with_stages(vec![spec.name.clone()]));
        }

        if let Some(existing) = self.stages.iter().find(|s| s.sequence == spec.sequence) {
            return Err(PipelineValidationError::new(format!(
                "Stages '{}' and '{}' share sequence number {}",
                existing.name, spec.name, spec.sequence
            ))
            .with_stages(vec![existing.name.clone(), spec.name.clone()]));
        }

        if let Some(dep) = &spec.depends_on {
            let Some(upstream) = self.stages.iter().find(|s| &s.name == dep) else {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' depends on unknown stage '{}'",
                    spec.name, dep
                ))
                .with_stages(vec![spec.name.clone(), dep.clone()]));
            };
            if upstream.sequence >= spec.sequence {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' (seq {}) must run after its dependency '{}' (seq {})",
                    spec.name, spec.sequence, upstream.name, upstream.sequence
                ))
                .with_stages(vec![spec.name.clone(), upstream.name.clone()]));
            }
        }

        self.stages.push(spec);
        Ok(())
    }

    /// Replaces the terminal aggregator.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline, ordering stages by sequence number.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages.
    pub fn build(mut self) -> Result<MetricPipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages"));
        }

        self.stages.sort_by_key(|s| s.sequence);

        Ok(MetricPipeline::new(
            self.name,
            self.stages,
            self.aggregator,
            self.event_sink,
        ))
    }
}
