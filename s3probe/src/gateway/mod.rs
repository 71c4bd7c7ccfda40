//! Storage gateway capability.
//!
//! The pipeline only ever talks to storage through [`StorageGateway`]. The
//! production implementation wraps an `object_store` S3 client; tests use
//! [`MockGateway`](crate::testing::MockGateway) or a mockall mock.

mod s3;

pub use s3::ObjectStoreGateway;

use crate::errors::GatewayError;
use async_trait::async_trait;
use std::path::Path;

/// The four storage operations a probe run needs.
///
/// Every call may fail; callers never interpret the error beyond its text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Connectivity and credential check. Only success or failure matters.
    async fn list_buckets(&self) -> Result<(), GatewayError>;

    /// Uploads the file at `local_path` as `object_name`.
    async fn upload_object(&self, local_path: &Path, object_name: &str) -> Result<(), GatewayError>;

    /// Downloads `object_name` into `local_path`, replacing it.
    async fn download_object(&self, object_name: &str, local_path: &Path) -> Result<(), GatewayError>;

    /// Deletes `object_name`.
    async fn delete_object(&self, object_name: &str) -> Result<(), GatewayError>;
}

/// A gateway standing in for a client that could not be constructed.
///
/// Every operation fails with the construction error.
#[derive(Debug, Clone)]
pub struct UnavailableGateway {
    reason: String,
}

impl UnavailableGateway {
    /// Creates a gateway that fails every call with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail(&self) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl StorageGateway for UnavailableGateway {
    async fn list_buckets(&self) -> Result<(), GatewayError> {
        self.fail()
    }

    async fn upload_object(&self, _local_path: &Path, _object_name: &str) -> Result<(), GatewayError> {
        self.fail()
    }

    async fn download_object(&self, _object_name: &str, _local_path: &Path) -> Result<(), GatewayError> {
        self.fail()
    }

    async fn delete_object(&self, _object_name: &str) -> Result<(), GatewayError> {
        self.fail()
    }
}
