//! The list, write, read and delete checks.

use super::{Stage, StageContext};
use crate::core::StageOutcome;
use crate::errors::ProbeError;
use crate::run::RunObjectRef;
use async_trait::async_trait;
use chrono::Utc;
use md5::{Digest, Md5};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name of the connectivity stage.
pub const LIST: &str = "List";
/// Name of the upload stage.
pub const PUT: &str = "Put";
/// Name of the download stage.
pub const GET: &str = "Get";
/// Name of the delete stage.
pub const DEL: &str = "Del";

/// Summary used when no uploaded object is available to read or delete.
pub const NO_ENDPOINTS: &str = "No endpoints found to test";

/// Contents of the generated payload: the digits 1 through 0, one per line.
const PAYLOAD: &[u8] = b"1\n2\n3\n4\n5\n6\n7\n8\n9\n0\n";

fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Builds a collision-resistant object name from the current time and a UUID.
fn unique_object_name() -> String {
    format!("testfile-put-{}-{}.txt", Utc::now().timestamp(), Uuid::new_v4())
}

/// Connectivity and credential check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListStage;

#[async_trait]
impl Stage for ListStage {
    fn name(&self) -> &str {
        LIST
    }

    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
        ctx.config.connection()?;
        ctx.gateway
            .list_buckets()
            .await
            .map_err(|e| ProbeError::gateway("s3.list_bucket", e))?;
        Ok(StageOutcome::ok("Buckets successfully listed"))
    }
}

/// Uploads a freshly generated payload under a unique name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutStage;

#[async_trait]
impl Stage for PutStage {
    fn name(&self) -> &str {
        PUT
    }

    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
        let payload_path = ctx.workdir.payload_path();
        tokio::fs::write(&payload_path, PAYLOAD)
            .await
            .map_err(ProbeError::Payload)?;

        let object_name = unique_object_name();
        ctx.gateway
            .upload_object(&payload_path, &object_name)
            .await
            .map_err(|e| ProbeError::gateway("upload file", e))?;

        let endpoint_key = ctx.config.endpoint_key();
        info!(endpoint = %endpoint_key, object = %object_name, "Uploaded probe object");
        ctx.objects.remember(RunObjectRef {
            endpoint_key,
            object_name,
            payload_path,
            payload_md5: md5_hex(PAYLOAD),
        });

        Ok(StageOutcome::ok("File was copied to the S3 endpoint"))
    }
}

/// Downloads the uploaded object and compares it with the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetStage;

#[async_trait]
impl Stage for GetStage {
    fn name(&self) -> &str {
        GET
    }

    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
        if ctx.objects.is_empty() {
            return Ok(StageOutcome::warning(NO_ENDPOINTS));
        }

        let download_path = ctx.workdir.download_path();
        for object in ctx.objects.iter() {
            ctx.gateway
                .download_object(&object.object_name, &download_path)
                .await
                .map_err(|e| ProbeError::gateway("download_file", e))?;

            let downloaded = tokio::fs::read(&download_path)
                .await
                .map_err(|e| ProbeError::gateway("download_file", e.into()))?;
            let uploaded = tokio::fs::read(&object.payload_path)
                .await
                .map_err(ProbeError::Payload)?;

            if downloaded != uploaded {
                let actual_md5 = md5_hex(&downloaded);
                warn!(
                    object = %object.object_name,
                    expected_md5 = %object.payload_md5,
                    actual_md5 = %actual_md5,
                    "Downloaded content differs from upload"
                );
                return Err(ProbeError::Integrity {
                    expected_md5: object.payload_md5.clone(),
                    actual_md5,
                });
            }
            debug!(object = %object.object_name, md5 = %object.payload_md5, "Content verified");
        }

        Ok(StageOutcome::ok("File was copied from the S3 Storage."))
    }
}

/// Deletes the uploaded object.
///
/// Unlike the read check, finding nothing to delete is CRITICAL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelStage;

#[async_trait]
impl Stage for DelStage {
    fn name(&self) -> &str {
        DEL
    }

    async fn execute(&self, ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
        if ctx.objects.is_empty() {
            return Ok(StageOutcome::critical(NO_ENDPOINTS));
        }

        for object in ctx.objects.iter() {
            ctx.gateway
                .delete_object(&object.object_name)
                .await
                .map_err(|e| ProbeError::gateway("delete", e))?;
            info!(object = %object.object_name, "Deleted probe object");
        }

        Ok(StageOutcome::ok("File was deleted from the S3 storage endpoint."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::core::{ProbeStatus, ResultLog};
    use crate::errors::{GatewayError, INTEGRITY_MISMATCH};
    use crate::gateway::{MockStorageGateway, StorageGateway};
    use crate::run::{RunObjectStore, Workdir};
    use crate::testing::{GatewayCall, MockGateway, Operation};
    use std::path::PathBuf;

    fn config() -> ProbeConfig {
        ProbeConfig::new()
            .with_endpoint("http://localhost:8080")
            .with_credentials("access", "secret")
            .with_bucket("bucket")
    }

    struct Harness {
        config: ProbeConfig,
        objects: RunObjectStore,
        workdir: Workdir,
        results: ResultLog,
    }

    impl Harness {
        fn new(config: ProbeConfig) -> Self {
            Self {
                config,
                objects: RunObjectStore::new(),
                workdir: Workdir::create().unwrap(),
                results: ResultLog::new(),
            }
        }

        async fn run(
            &mut self,
            stage: &dyn Stage,
            gateway: &dyn StorageGateway,
        ) -> Result<StageOutcome, ProbeError> {
            let mut ctx = StageContext {
                config: &self.config,
                gateway,
                objects: &mut self.objects,
                workdir: &self.workdir,
                results: &self.results,
            };
            stage.execute(&mut ctx).await
        }

        fn seed_object(&mut self, name: &str) -> PathBuf {
            let payload_path = self.workdir.payload_path();
            std::fs::write(&payload_path, PAYLOAD).unwrap();
            self.objects.remember(RunObjectRef {
                endpoint_key: self.config.endpoint_key(),
                object_name: name.to_string(),
                payload_path: payload_path.clone(),
                payload_md5: md5_hex(PAYLOAD),
            });
            payload_path
        }
    }

    #[test]
    fn test_object_names_are_unique() {
        let a = unique_object_name();
        let b = unique_object_name();
        assert_ne!(a, b);
        assert!(a.starts_with("testfile-put-"));
        assert!(a.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_list_success() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());

        let outcome = harness.run(&ListStage, &gateway).await.unwrap();

        assert_eq!(outcome, StageOutcome::ok("Buckets successfully listed"));
        assert_eq!(gateway.calls(), vec![GatewayCall::ListBuckets]);
    }

    #[tokio::test]
    async fn test_list_failure_embeds_error_text() {
        let mut gateway = MockStorageGateway::new();
        gateway
            .expect_list_buckets()
            .times(1)
            .returning(|| Err(GatewayError::Transport("S3 Error".to_string())));
        let mut harness = Harness::new(config());

        let err = harness.run(&ListStage, &gateway).await.unwrap_err();

        assert_eq!(err.to_string(), "problem invoking s3.list_bucket(): S3 Error");
    }

    #[tokio::test]
    async fn test_list_without_credentials_never_calls_gateway() {
        let mut gateway = MockStorageGateway::new();
        gateway.expect_list_buckets().never();
        let mut harness = Harness::new(ProbeConfig::new().with_endpoint("http://x"));

        let err = harness.run(&ListStage, &gateway).await.unwrap_err();

        assert!(matches!(err, ProbeError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_put_records_uploaded_object() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());

        let outcome = harness.run(&PutStage, &gateway).await.unwrap();

        assert_eq!(outcome, StageOutcome::ok("File was copied to the S3 endpoint"));
        let recorded = harness.objects.get("http://localhost:8080").unwrap();
        assert_eq!(gateway.stored(&recorded.object_name), Some(PAYLOAD.to_vec()));
        assert_eq!(recorded.payload_md5, md5_hex(PAYLOAD));
    }

    #[tokio::test]
    async fn test_put_failure_leaves_store_empty() {
        let gateway = MockGateway::new().fail_on(Operation::Upload, "access denied");
        let mut harness = Harness::new(config());

        let err = harness.run(&PutStage, &gateway).await.unwrap_err();

        assert_eq!(err.to_string(), "problem invoking upload file(): access denied");
        assert!(harness.objects.is_empty());
    }

    #[tokio::test]
    async fn test_get_verifies_content() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());
        harness.run(&PutStage, &gateway).await.unwrap();

        let outcome = harness.run(&GetStage, &gateway).await.unwrap();

        assert_eq!(outcome, StageOutcome::ok("File was copied from the S3 Storage."));
    }

    #[tokio::test]
    async fn test_get_content_mismatch() {
        let gateway = MockGateway::new().corrupt_downloads();
        let mut harness = Harness::new(config());
        harness.run(&PutStage, &gateway).await.unwrap();

        let err = harness.run(&GetStage, &gateway).await.unwrap_err();

        assert!(matches!(err, ProbeError::Integrity { .. }));
        assert_eq!(err.to_string(), INTEGRITY_MISMATCH);
    }

    #[tokio::test]
    async fn test_get_download_failure() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());
        harness.seed_object("never-uploaded.txt");

        let err = harness.run(&GetStage, &gateway).await.unwrap_err();

        assert!(err
            .to_string()
            .starts_with("problem invoking download_file(): not found"));
    }

    #[tokio::test]
    async fn test_get_with_nothing_uploaded_warns() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());

        let outcome = harness.run(&GetStage, &gateway).await.unwrap();

        assert_eq!(outcome.status, ProbeStatus::Warning);
        assert_eq!(outcome.summary, NO_ENDPOINTS);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_del_with_nothing_uploaded_is_critical() {
        let gateway = MockGateway::new();
        let mut harness = Harness::new(config());

        let outcome = harness.run(&DelStage, &gateway).await.unwrap();

        assert_eq!(outcome.status, ProbeStatus::Critical);
        assert_eq!(outcome.summary, NO_ENDPOINTS);
    }

    #[tokio::test]
    async fn test_del_deletes_recorded_object() {
        let mut gateway = MockStorageGateway::new();
        gateway
            .expect_delete_object()
            .withf(|name: &str| name == "testfile-put-1-abc.txt")
            .times(1)
            .returning(|_| Ok(()));
        let mut harness = Harness::new(config());
        harness.seed_object("testfile-put-1-abc.txt");

        let outcome = harness.run(&DelStage, &gateway).await.unwrap();

        assert_eq!(
            outcome,
            StageOutcome::ok("File was deleted from the S3 storage endpoint.")
        );
    }

    #[tokio::test]
    async fn test_del_failure() {
        let gateway = MockGateway::new().fail_on(Operation::Delete, "timeout");
        let mut harness = Harness::new(config());
        harness.seed_object("obj.txt");

        let err = harness.run(&DelStage, &gateway).await.unwrap_err();

        assert_eq!(err.to_string(), "problem invoking delete(): timeout");
    }
}
