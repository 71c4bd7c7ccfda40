//! Sequential metric pipeline.

use super::{Aggregator, StageSpec};
use crate::config::ProbeConfig;
use crate::core::{ProbeStatus, ResultLog, StageOutcome, StageResult};
use crate::errors::ProbeError;
use crate::events::EventSink;
use crate::gateway::StorageGateway;
use crate::report::ProbeReport;
use crate::run::{RunObjectStore, Workdir};
use crate::stages::StageContext;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, warn, Instrument};

/// Summary recorded for mutating stages when the endpoint is read-only.
pub const READ_ONLY: &str = "read-only endpoint";

/// An ordered set of stages executed one at a time.
///
/// Each stage produces exactly one [`StageResult`], in sequence order, and
/// no stage starts before the previous result is recorded.
pub struct MetricPipeline {
    name: String,
    stages: Vec<StageSpec>,
    aggregator: Aggregator,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for MetricPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricPipeline")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

impl MetricPipeline {
    pub(super) fn new(
        name: String,
        stages: Vec<StageSpec>,
        aggregator: Aggregator,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name,
            stages,
            aggregator,
            event_sink,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Runs every stage in a fresh temporary working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Workdir`] if the working directory cannot be
    /// created. Stage failures never surface here; they are recorded.
    pub async fn run(
        &self,
        config: &ProbeConfig,
        gateway: &dyn StorageGateway,
    ) -> Result<ProbeReport, ProbeError> {
        let mut workdir = Workdir::create().map_err(ProbeError::Workdir)?;
        Ok(self.run_in(config, gateway, &mut workdir).await)
    }

    /// Runs every stage using `workdir`, which is released afterwards.
    pub async fn run_in(
        &self,
        config: &ProbeConfig,
        gateway: &dyn StorageGateway,
        workdir: &mut Workdir,
    ) -> ProbeReport {
        let started = Instant::now();
        let mut objects = RunObjectStore::new();
        let mut log = ResultLog::new();

        for spec in &self.stages {
            let result = self
                .execute_stage(spec, config, gateway, &mut objects, workdir, &log)
                .instrument(info_span!("stage", stage = %spec.name, seq = spec.sequence))
                .await;
            log.record(result);
        }

        let verdict = self.aggregator.finish(&log, workdir);
        self.event_sink.emit(
            "probe.completed",
            Some(serde_json::json!({
                "pipeline": &self.name,
                "status": verdict.status,
                "summary": &verdict.summary,
                "duration_ms": started.elapsed().as_secs_f64() * 1000.0,
            })),
        );

        ProbeReport::new(&self.name, log, verdict)
    }

    async fn execute_stage(
        &self,
        spec: &StageSpec,
        config: &ProbeConfig,
        gateway: &dyn StorageGateway,
        objects: &mut RunObjectStore,
        workdir: &Workdir,
        log: &ResultLog,
    ) -> StageResult {
        let name = spec.name.as_str();

        if let Some(dep) = spec.depends_on.as_deref() {
            let upstream = log.status_of(dep);
            if upstream != Some(ProbeStatus::Ok) {
                debug!(stage = name, dependency = dep, upstream = ?upstream, "Skipping stage");
                self.event_sink.emit(
                    "stage.skipped",
                    Some(serde_json::json!({ "stage": name, "dependency": dep })),
                );
                return StageResult::new(name, ProbeStatus::Warning, format!("{name} skipped"));
            }
        }

        if config.read_only && spec.mutating {
            debug!(stage = name, "Read-only endpoint, not touching storage");
            self.event_sink.emit(
                "stage.skipped",
                Some(serde_json::json!({ "stage": name, "reason": READ_ONLY })),
            );
            return StageResult::new(name, ProbeStatus::Ok, READ_ONLY);
        }

        self.event_sink
            .emit("stage.started", Some(serde_json::json!({ "stage": name })));
        let start = Instant::now();

        let mut ctx = StageContext {
            config,
            gateway,
            objects,
            workdir,
            results: log,
        };
        let outcome = match AssertUnwindSafe(spec.runner.execute(&mut ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(stage = name, error = %err, "Stage failed");
                StageOutcome::critical(err.to_string())
            }
            Err(_) => {
                warn!(stage = name, "Stage panicked");
                StageOutcome::critical(format!("{name} panicked"))
            }
        };
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        let event = if outcome.status.is_critical() {
            "stage.failed"
        } else {
            "stage.completed"
        };
        self.event_sink.emit(
            event,
            Some(serde_json::json!({
                "stage": name,
                "status": outcome.status,
                "summary": &outcome.summary,
                "duration_ms": duration_ms,
            })),
        );

        StageResult::from_outcome(name, outcome).with_duration_ms(duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayError;
    use crate::events::CollectingEventSink;
    use crate::gateway::MockStorageGateway;
    use crate::pipeline::PipelineBuilder;
    use crate::stages::{FnStage, Stage, DEL, GET, LIST, NO_ENDPOINTS, PUT};
    use crate::testing::{
        assert_stage, assert_stage_status, assert_verdict, GatewayCall, MockGateway, Operation,
    };
    use pretty_assertions::assert_eq;

    fn config() -> ProbeConfig {
        ProbeConfig::new()
            .with_endpoint("http://localhost:8080")
            .with_credentials("access", "secret")
            .with_bucket("bucket")
    }

    fn probe() -> MetricPipeline {
        PipelineBuilder::storage_probe().unwrap().build().unwrap()
    }

    #[tokio::test]
    async fn test_happy_path() {
        let gateway = MockGateway::new();

        let report = probe().run(&config(), &gateway).await.unwrap();

        assert_eq!(report.results.len(), 4);
        assert_stage(&report, LIST, ProbeStatus::Ok, "Buckets successfully listed");
        assert_stage(&report, PUT, ProbeStatus::Ok, "File was copied to the S3 endpoint");
        assert_stage(&report, GET, ProbeStatus::Ok, "File was copied from the S3 Storage.");
        assert_stage(
            &report,
            DEL,
            ProbeStatus::Ok,
            "File was deleted from the S3 storage endpoint.",
        );
        assert_verdict(&report, ProbeStatus::Ok, "All fine");
    }

    #[tokio::test]
    async fn test_object_name_round_trip() {
        let gateway = MockGateway::new();

        probe().run(&config(), &gateway).await.unwrap();

        let calls = gateway.calls();
        let names: Vec<_> = calls.iter().filter_map(GatewayCall::object_name).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| *n == names[0]));
        assert!(matches!(calls[1], GatewayCall::Upload(_)));
        assert!(matches!(calls[2], GatewayCall::Download(_)));
        assert!(matches!(calls[3], GatewayCall::Delete(_)));
    }

    #[tokio::test]
    async fn test_list_failure_cascades_without_gateway_calls() {
        let mut gateway = MockStorageGateway::new();
        gateway
            .expect_list_buckets()
            .times(1)
            .returning(|| Err(GatewayError::Transport("S3 Error".to_string())));
        gateway.expect_upload_object().never();
        gateway.expect_download_object().never();
        gateway.expect_delete_object().never();
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::storage_probe()
            .unwrap()
            .with_event_sink(sink.clone())
            .build()
            .unwrap();

        let report = pipeline.run(&config(), &gateway).await.unwrap();

        assert_stage(
            &report,
            LIST,
            ProbeStatus::Critical,
            "problem invoking s3.list_bucket(): S3 Error",
        );
        assert_stage(&report, PUT, ProbeStatus::Warning, "Put skipped");
        assert_stage(&report, GET, ProbeStatus::Warning, "Get skipped");
        assert_stage(&report, DEL, ProbeStatus::Warning, "Del skipped");
        assert_verdict(&report, ProbeStatus::Critical, "Critical error executing tests");
        assert_eq!(sink.stages_for("stage.skipped"), vec!["Put", "Get", "Del"]);
        assert_eq!(sink.events_of_type("stage.failed").len(), 1);
        assert_eq!(sink.events_of_type("probe.completed").len(), 1);
    }

    #[tokio::test]
    async fn test_upload_timeout_is_critical_and_skips_dependents() {
        let mut gateway = MockStorageGateway::new();
        gateway.expect_list_buckets().times(1).returning(|| Ok(()));
        gateway
            .expect_upload_object()
            .times(1)
            .returning(|_, _| Err(GatewayError::Timeout(std::time::Duration::from_secs(60))));
        gateway.expect_download_object().never();
        gateway.expect_delete_object().never();

        let report = probe().run(&config(), &gateway).await.unwrap();

        assert_stage(
            &report,
            PUT,
            ProbeStatus::Critical,
            "problem invoking upload file(): operation timed out after 60s",
        );
        assert_stage(&report, GET, ProbeStatus::Warning, "Get skipped");
        assert_stage(&report, DEL, ProbeStatus::Warning, "Del skipped");
        assert_verdict(&report, ProbeStatus::Critical, "Critical error executing tests");
    }

    #[tokio::test]
    async fn test_missing_configuration_is_critical_on_list() {
        let gateway = MockGateway::new();
        let config = ProbeConfig::new().with_endpoint("http://localhost:8080");

        let report = probe().run(&config, &gateway).await.unwrap();

        assert_stage(
            &report,
            LIST,
            ProbeStatus::Critical,
            "Missing required connection parameters: access key, secret key, bucket",
        );
        assert_stage_status(&report, PUT, ProbeStatus::Warning);
        assert_eq!(gateway.call_count(), 0);
        assert_verdict(&report, ProbeStatus::Critical, "Critical error executing tests");
    }

    #[tokio::test]
    async fn test_read_only_touches_nothing_but_list() {
        let gateway = MockGateway::new()
            .fail_on(Operation::Upload, "must not upload")
            .fail_on(Operation::Download, "must not download")
            .fail_on(Operation::Delete, "must not delete");

        let report = probe()
            .run(&config().with_read_only(true), &gateway)
            .await
            .unwrap();

        for stage in [PUT, GET, DEL] {
            assert_stage(&report, stage, ProbeStatus::Ok, READ_ONLY);
        }
        assert_eq!(gateway.calls(), vec![GatewayCall::ListBuckets]);
        assert_verdict(&report, ProbeStatus::Ok, "All fine");
    }

    #[tokio::test]
    async fn test_read_only_still_skips_after_list_failure() {
        let gateway = MockGateway::new().fail_on(Operation::List, "unreachable");

        let report = probe()
            .run(&config().with_read_only(true), &gateway)
            .await
            .unwrap();

        assert_stage(&report, PUT, ProbeStatus::Warning, "Put skipped");
    }

    #[tokio::test]
    async fn test_integrity_failure() {
        let gateway = MockGateway::new().corrupt_downloads();

        let report = probe().run(&config(), &gateway).await.unwrap();

        assert_stage(
            &report,
            GET,
            ProbeStatus::Critical,
            "Downloaded file content does not match uploaded file",
        );
        assert_stage(&report, DEL, ProbeStatus::Warning, "Del skipped");
        assert_verdict(&report, ProbeStatus::Critical, "Critical error executing tests");
    }

    #[tokio::test]
    async fn test_upload_failure_skips_read_and_delete() {
        let gateway = MockGateway::new().fail_on(Operation::Upload, "403 Forbidden");

        let report = probe().run(&config(), &gateway).await.unwrap();

        assert_stage(
            &report,
            PUT,
            ProbeStatus::Critical,
            "problem invoking upload file(): 403 Forbidden",
        );
        assert_stage(&report, GET, ProbeStatus::Warning, "Get skipped");
        assert_stage(&report, DEL, ProbeStatus::Warning, "Del skipped");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let gateway = MockGateway::new().fail_on(Operation::Delete, "gone");

        let report = probe().run(&config(), &gateway).await.unwrap();

        assert_stage(&report, DEL, ProbeStatus::Critical, "problem invoking delete(): gone");
        assert_verdict(&report, ProbeStatus::Critical, "Critical error executing tests");
    }

    #[tokio::test]
    async fn test_only_direct_dependency_is_checked() {
        let pipeline = PipelineBuilder::new("p")
            .stage(1, Arc::new(FnStage::new("a", |_| Ok(StageOutcome::warning("meh")))), None)
            .unwrap()
            .stage(2, Arc::new(FnStage::new("b", |_| Ok(StageOutcome::ok("b ran")))), Some("a"))
            .unwrap()
            .stage(3, Arc::new(FnStage::new("c", |_| Ok(StageOutcome::ok("c ran")))), None)
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.run(&config(), &MockGateway::new()).await.unwrap();

        assert_stage(&report, "b", ProbeStatus::Warning, "b skipped");
        assert_stage(&report, "c", ProbeStatus::Ok, "c ran");
        assert_verdict(&report, ProbeStatus::Warning, "Some of the tests returned a warning");
    }

    #[tokio::test]
    async fn test_del_without_put_is_critical() {
        let pipeline = PipelineBuilder::new("p")
            .stage(1, Arc::new(crate::stages::ListStage), None)
            .unwrap()
            .stage(2, Arc::new(crate::stages::DelStage), Some(LIST))
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.run(&config(), &MockGateway::new()).await.unwrap();

        assert_stage(&report, DEL, ProbeStatus::Critical, NO_ENDPOINTS);
    }

    #[derive(Debug)]
    struct PanickingStage;

    #[async_trait::async_trait]
    impl Stage for PanickingStage {
        fn name(&self) -> &str {
            "Boom"
        }

        async fn execute(&self, _ctx: &mut StageContext<'_>) -> Result<StageOutcome, ProbeError> {
            panic!("stage exploded");
        }
    }

    #[tokio::test]
    async fn test_panicking_stage_is_recorded_as_critical() {
        let pipeline = PipelineBuilder::new("p")
            .stage(1, Arc::new(PanickingStage), None)
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.run(&config(), &MockGateway::new()).await.unwrap();

        assert_stage(&report, "Boom", ProbeStatus::Critical, "Boom panicked");
    }

    #[tokio::test]
    async fn test_workdir_released_after_run() {
        let parent = tempfile::tempdir().unwrap();
        let mut workdir = Workdir::create_in(parent.path()).unwrap();
        let path = workdir.path().to_path_buf();

        probe().run_in(&config(), &MockGateway::new(), &mut workdir).await;

        assert!(workdir.is_released());
        assert!(!path.exists());
    }
}
