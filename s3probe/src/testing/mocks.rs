//! Mock gateways for testing.

use crate::errors::GatewayError;
use crate::gateway::StorageGateway;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// A gateway operation, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_buckets`
    List,
    /// `upload_object`
    Upload,
    /// `download_object`
    Download,
    /// `delete_object`
    Delete,
}

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `list_buckets` was called.
    ListBuckets,
    /// `upload_object` was called for the object.
    Upload(String),
    /// `download_object` was called for the object.
    Download(String),
    /// `delete_object` was called for the object.
    Delete(String),
}

impl GatewayCall {
    /// Returns the object name the call referred to, if any.
    #[must_use]
    pub fn object_name(&self) -> Option<&str> {
        match self {
            Self::ListBuckets => None,
            Self::Upload(name) | Self::Download(name) | Self::Delete(name) => Some(name),
        }
    }
}

/// An in-memory gateway that records every call.
///
/// Uploaded files are kept in a map so downloads return what was uploaded,
/// unless [`corrupt_downloads`](Self::corrupt_downloads) is set.
#[derive(Debug, Default)]
pub struct MockGateway {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<GatewayCall>>,
    failures: HashMap<Operation, String>,
    corrupt: bool,
}

impl MockGateway {
    /// Creates a gateway where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `operation` fail with a transport error carrying `message`.
    #[must_use]
    pub fn fail_on(mut self, operation: Operation, message: impl Into<String>) -> Self {
        self.failures.insert(operation, message.into());
        self
    }

    /// Makes downloads return content different from what was uploaded.
    #[must_use]
    pub fn corrupt_downloads(mut self) -> Self {
        self.corrupt = true;
        self
    }

    /// Returns all calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the stored bytes for `object_name`.
    #[must_use]
    pub fn stored(&self, object_name: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(object_name).cloned()
    }

    fn record(&self, call: GatewayCall, operation: Operation) -> Result<(), GatewayError> {
        self.calls.lock().push(call);
        match self.failures.get(&operation) {
            Some(message) => Err(GatewayError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageGateway for MockGateway {
    async fn list_buckets(&self) -> Result<(), GatewayError> {
        self.record(GatewayCall::ListBuckets, Operation::List)
    }

    async fn upload_object(&self, local_path: &Path, object_name: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::Upload(object_name.to_string()), Operation::Upload)?;
        let data = tokio::fs::read(local_path).await?;
        self.objects.lock().insert(object_name.to_string(), data);
        Ok(())
    }

    async fn download_object(&self, object_name: &str, local_path: &Path) -> Result<(), GatewayError> {
        self.record(GatewayCall::Download(object_name.to_string()), Operation::Download)?;
        let mut data = self
            .stored(object_name)
            .ok_or_else(|| GatewayError::NotFound(object_name.to_string()))?;
        if self.corrupt {
            data.reverse();
            data.push(b'!');
        }
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }

    async fn delete_object(&self, object_name: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::Delete(object_name.to_string()), Operation::Delete)?;
        self.objects
            .lock()
            .remove(object_name)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound(object_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::write(&src, b"abc").unwrap();

        let gateway = MockGateway::new();
        gateway.upload_object(&src, "o").await.unwrap();
        gateway.download_object("o", &dst).await.unwrap();
        gateway.delete_object("o").await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"abc");
        assert_eq!(gateway.call_count(), 3);
        assert!(gateway.stored("o").is_none());
        assert_eq!(gateway.calls()[1].object_name(), Some("o"));
    }

    #[tokio::test]
    async fn test_mock_gateway_injected_failure_still_records() {
        let gateway = MockGateway::new().fail_on(Operation::List, "denied");

        let err = gateway.list_buckets().await.unwrap_err();

        assert_eq!(err.to_string(), "denied");
        assert_eq!(gateway.calls(), vec![GatewayCall::ListBuckets]);
    }
}
