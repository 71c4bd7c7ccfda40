//! Error types for s3probe.
//!
//! Every error raised inside a stage body is converted into a
//! [`StageResult`](crate::core::StageResult) at the stage boundary. The
//! `Display` text of [`ProbeError`] therefore doubles as the stage summary.

use std::time::Duration;
use thiserror::Error;

/// Summary recorded when downloaded content differs from the uploaded payload.
pub const INTEGRITY_MISMATCH: &str = "Downloaded file content does not match uploaded file";

/// The main error type for probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Required connection parameters are missing.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The storage gateway failed.
    #[error("problem invoking {operation}(): {source}")]
    Gateway {
        /// The operation label reported to the operator.
        operation: &'static str,
        /// The underlying gateway failure.
        #[source]
        source: GatewayError,
    },

    /// Downloaded content differs from what was uploaded.
    #[error("Downloaded file content does not match uploaded file")]
    Integrity {
        /// MD5 of the uploaded payload.
        expected_md5: String,
        /// MD5 of the downloaded copy.
        actual_md5: String,
    },

    /// The local payload file could not be created.
    #[error("Error creating source file: {0}")]
    Payload(#[source] std::io::Error),

    /// The scoped working directory could not be created or used.
    #[error("Working directory error: {0}")]
    Workdir(#[source] std::io::Error),

    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),
}

impl ProbeError {
    /// Wraps a gateway failure with the operation label.
    #[must_use]
    pub const fn gateway(operation: &'static str, source: GatewayError) -> Self {
        Self::Gateway { operation, source }
    }
}

/// Error raised when required connection parameters are absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Missing required connection parameters: {}", missing.join(", "))]
pub struct ConfigurationError {
    /// Names of the missing parameters.
    pub missing: Vec<&'static str>,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }
}

/// Failures reported by a [`StorageGateway`](crate::gateway::StorageGateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network, protocol or authentication failure.
    #[error("{0}")]
    Transport(String),

    /// The requested object or bucket does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation exceeded the configured timeout.
    #[error("operation timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// No client could be constructed for the endpoint.
    #[error("storage client unavailable: {0}")]
    Unavailable(String),

    /// Local file IO failed while staging an object.
    #[error("local IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_summary() {
        let err = ProbeError::gateway(
            "upload file",
            GatewayError::Transport("connection refused".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "problem invoking upload file(): connection refused"
        );
    }

    #[test]
    fn test_integrity_summary_is_fixed() {
        let err = ProbeError::Integrity {
            expected_md5: "aa".to_string(),
            actual_md5: "bb".to_string(),
        };
        assert_eq!(err.to_string(), INTEGRITY_MISMATCH);
    }

    #[test]
    fn test_configuration_error_lists_missing() {
        let err = ConfigurationError::new(vec!["access key", "bucket"]);
        assert_eq!(
            err.to_string(),
            "Missing required connection parameters: access key, bucket"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = GatewayError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "operation timed out after 60s");
    }

    #[test]
    fn test_validation_error_stages() {
        let err = PipelineValidationError::new("bad").with_stages(vec!["Put".to_string()]);
        assert_eq!(err.stages, vec!["Put".to_string()]);
        assert_eq!(ProbeError::from(err).to_string(), "bad");
    }
}
