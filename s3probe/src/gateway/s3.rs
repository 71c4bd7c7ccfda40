//! `object_store` backed gateway.

use super::StorageGateway;
use crate::config::ProbeConfig;
use crate::errors::{GatewayError, ProbeError};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore, RetryConfig};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_REGION: &str = "us-east-1";

impl From<object_store::Error> for GatewayError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Gateway over any [`ObjectStore`], normally an S3-compatible bucket.
///
/// Every call is bounded by the configured per-operation timeout and
/// client-side retries are disabled.
#[derive(Debug, Clone)]
pub struct ObjectStoreGateway {
    store: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl ObjectStoreGateway {
    /// Builds an S3 client for the endpoint and bucket in `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if credentials or bucket are missing, or a
    /// gateway error if the client cannot be built.
    pub fn connect(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let conn = config.connection()?;
        let timeout = config.timeout();

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(conn.bucket)
            .with_access_key_id(conn.access_key)
            .with_secret_access_key(conn.secret_key)
            .with_region(conn.region.unwrap_or(DEFAULT_REGION))
            .with_client_options(
                ClientOptions::new()
                    .with_timeout(timeout)
                    .with_connect_timeout(timeout),
            )
            .with_retry(RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            });

        if let Some(endpoint) = conn.endpoint {
            // Path-style requests for MinIO, Ceph and friends
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| {
            ProbeError::gateway("connect", GatewayError::Unavailable(e.to_string()))
        })?;

        debug!(bucket = conn.bucket, endpoint = ?conn.endpoint, "Built S3 client");
        Ok(Self::from_store(Arc::new(store), timeout))
    }

    /// Wraps an existing store.
    #[must_use]
    pub fn from_store(store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Returns the per-operation timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = object_store::Result<T>> + Send,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl StorageGateway for ObjectStoreGateway {
    async fn list_buckets(&self) -> Result<(), GatewayError> {
        // A bucket-scoped client cannot enumerate buckets; one delimited
        // listing of the root exercises the same credentials and transport.
        let listing = self.bounded(self.store.list_with_delimiter(None)).await?;
        debug!(
            prefixes = listing.common_prefixes.len(),
            objects = listing.objects.len(),
            "Listed bucket root"
        );
        Ok(())
    }

    async fn upload_object(&self, local_path: &Path, object_name: &str) -> Result<(), GatewayError> {
        let data = tokio::fs::read(local_path).await?;
        let location = ObjectPath::from(object_name);
        self.bounded(self.store.put(&location, data.into())).await?;
        Ok(())
    }

    async fn download_object(&self, object_name: &str, local_path: &Path) -> Result<(), GatewayError> {
        let location = ObjectPath::from(object_name);
        let bytes = self
            .bounded(async { self.store.get(&location).await?.bytes().await })
            .await?;
        tokio::fs::write(local_path, &bytes).await?;
        Ok(())
    }

    async fn delete_object(&self, object_name: &str) -> Result<(), GatewayError> {
        let location = ObjectPath::from(object_name);
        self.bounded(self.store.delete(&location)).await
    }
}
