//! Stage specifications.

use crate::errors::PipelineValidationError;
use crate::stages::Stage;
use std::sync::Arc;

/// Specification for a single stage in a pipeline.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// Execution order; lower runs first.
    pub sequence: u32,
    /// The stage implementation.
    pub runner: Arc<dyn Stage>,
    /// Name of the earlier stage whose result gates this one.
    pub depends_on: Option<String>,
    /// Whether the stage has side effects suppressed in read-only mode.
    pub mutating: bool,
}

impl StageSpec {
    /// Creates a new stage specification named after its runner.
    #[must_use]
    pub fn new(sequence: u32, runner: Arc<dyn Stage>) -> Self {
        Self {
            name: runner.name().to_string(),
            sequence,
            runner,
            depends_on: None,
            mutating: false,
        }
    }

    /// Sets the dependency.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.depends_on = Some(dep.into());
        self
    }

    /// Marks the stage as mutating.
    #[must_use]
    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    /// Validates the stage specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the stage depends on itself.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new("Stage name cannot be empty"));
        }
        if self.depends_on.as_deref() == Some(self.name.as_str()) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' cannot depend on itself",
                self.name
            ))
            .with_stages(vec![self.name.clone()]));
        }
        Ok(())
    }
}
