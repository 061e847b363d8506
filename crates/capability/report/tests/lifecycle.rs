use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{ReportRun, ReportStatus, StatusObservation, StoreMetricRow, StoreRecord, StoreStatus};
use std::sync::Arc;
use uptime_engine::{BatchConfig, BatchOrchestrator, BatchSelector, CalendarResolver, IntervalAggregator, WindowPlanner};
use uptime_report::{ArtifactSink, CSV_HEADER, CsvArtifactSink, ReportError, ReportService};
use uptime_storage::{
    InMemoryObservationStore, InMemoryReportStore, InMemoryStoreCatalog, ReportStore, ReportUpdate, StorageError,
};

struct Harness {
    catalog: Arc<InMemoryStoreCatalog>,
    observations: Arc<InMemoryObservationStore>,
    reports: Arc<InMemoryReportStore>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            catalog: Arc::new(InMemoryStoreCatalog::new()),
            observations: Arc::new(InMemoryObservationStore::new()),
            reports: Arc::new(InMemoryReportStore::new()),
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn service(&self, batch_size: usize) -> ReportService {
        self.service_with(batch_size, Arc::new(CsvArtifactSink::new(self.dir.path())))
    }

    fn service_with(&self, batch_size: usize, artifacts: Arc<dyn ArtifactSink>) -> ReportService {
        self.service_over(batch_size, self.reports.clone(), artifacts)
    }

    fn service_over(
        &self,
        batch_size: usize,
        reports: Arc<dyn ReportStore>,
        artifacts: Arc<dyn ArtifactSink>,
    ) -> ReportService {
        let orchestrator = BatchOrchestrator::new(
            Arc::new(CalendarResolver::new(self.catalog.clone(), Tz::UTC)),
            Arc::new(IntervalAggregator::new(self.observations.clone())),
            BatchConfig {
                batch_size,
                concurrency: 4,
            },
        );
        ReportService::new(
            self.catalog.clone(),
            reports,
            Arc::new(WindowPlanner::new(self.observations.clone())),
            orchestrator,
            artifacts,
        )
    }

    fn seed(&self, store_id: &str, points: &[(i64, StoreStatus)]) {
        self.catalog
            .insert_store(StoreRecord {
                store_id: store_id.to_string(),
                timezone: None,
            })
            .expect("store");
        for (minutes_before, status) in points {
            self.observations
                .insert_observation(StatusObservation {
                    store_id: store_id.to_string(),
                    timestamp_utc: anchor() - Duration::minutes(*minutes_before),
                    status: *status,
                })
                .expect("observation");
        }
    }

    async fn create(&self, report_id: &str) {
        self.reports
            .create_report(report_id, anchor())
            .await
            .expect("create");
    }
}

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

struct BrokenSink;

#[async_trait]
impl ArtifactSink for BrokenSink {
    async fn write_artifact(&self, _report_id: &str, _rows: &[StoreMetricRow]) -> Result<String, ReportError> {
        Err(ReportError::Artifact("read-only filesystem".to_string()))
    }

    async fn read_artifact(&self, _location: &str) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::Artifact("read-only filesystem".to_string()))
    }

    async fn remove_artifact(&self, _location: &str) -> Result<(), ReportError> {
        Ok(())
    }
}

/// 完成状态写入总是失败的报表存储，其余操作转交内存实现。
struct CompletionRejectingStore {
    inner: Arc<InMemoryReportStore>,
}

#[async_trait]
impl ReportStore for CompletionRejectingStore {
    async fn create_report(&self, report_id: &str, created_at: DateTime<Utc>) -> Result<ReportRun, StorageError> {
        self.inner.create_report(report_id, created_at).await
    }

    async fn find_report(&self, report_id: &str) -> Result<Option<ReportRun>, StorageError> {
        self.inner.find_report(report_id).await
    }

    async fn update_report(&self, report_id: &str, update: ReportUpdate) -> Result<Option<ReportRun>, StorageError> {
        if update.status == ReportStatus::Completed {
            return Err(StorageError::new("connection reset"));
        }
        self.inner.update_report(report_id, update).await
    }

    async fn save_batch_rows(
        &self,
        report_id: &str,
        batch_index: usize,
        rows: &[StoreMetricRow],
    ) -> Result<usize, StorageError> {
        self.inner.save_batch_rows(report_id, batch_index, rows).await
    }

    async fn list_batch_rows(&self, report_id: &str) -> Result<Vec<StoreMetricRow>, StorageError> {
        self.inner.list_batch_rows(report_id).await
    }
}

#[tokio::test]
async fn completed_report_writes_csv() {
    let harness = Harness::new();
    harness.seed(
        "store-a",
        &[(90, StoreStatus::Active), (40, StoreStatus::Inactive), (0, StoreStatus::Active)],
    );
    harness.seed("store-b", &[(30, StoreStatus::Inactive)]);
    harness.create("report-1").await;

    let service = harness.service(1);
    let run = service
        .generate("report-1", BatchSelector::All)
        .await
        .expect("generate")
        .expect("exists");

    assert_eq!(run.status, ReportStatus::Completed);
    assert!(run.completed_at.is_some());
    let location = run.artifact_location.clone().expect("location");
    assert!(location.ends_with("report_report-1.csv"));
    assert_eq!(harness.reports.saved_batches("report-1"), vec![1, 2]);

    let csv = String::from_utf8(service.read_artifact(&run).await.expect("artifact")).expect("utf8");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    // 小时窗口只包含 -40 和 0 两条观测；-90 的在线间隔只计入天、周窗口
    assert_eq!(lines[1], "store-a,0.00,0.83,0.83,40.00,0.67,0.67");
    assert_eq!(lines[2], "store-b,0.00,0.00,0.00,0.00,0.00,0.00");
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn no_observations_fail_without_artifact() {
    let harness = Harness::new();
    harness.seed("store-a", &[]);
    harness.create("report-empty").await;

    let run = harness
        .service(100)
        .generate("report-empty", BatchSelector::All)
        .await
        .expect("generate")
        .expect("exists");

    assert_eq!(run.status, ReportStatus::Failed);
    assert!(run.artifact_location.is_none());
    assert!(run.completed_at.is_some());
    assert_eq!(std::fs::read_dir(harness.dir.path()).expect("dir").count(), 0);
}

#[tokio::test]
async fn invalid_batch_index_fails_before_any_batch() {
    let harness = Harness::new();
    harness.seed("store-a", &[(10, StoreStatus::Active), (0, StoreStatus::Active)]);
    harness.create("report-2").await;

    let run = harness
        .service(100)
        .generate("report-2", BatchSelector::Single(2))
        .await
        .expect("generate")
        .expect("exists");

    assert_eq!(run.status, ReportStatus::Failed);
    assert!(harness.reports.saved_batches("report-2").is_empty());
}

#[tokio::test]
async fn artifact_failure_marks_report_failed() {
    let harness = Harness::new();
    harness.seed("store-a", &[(10, StoreStatus::Active), (0, StoreStatus::Active)]);
    harness.create("report-3").await;

    let service = harness.service_with(100, Arc::new(BrokenSink));
    let run = service
        .generate("report-3", BatchSelector::All)
        .await
        .expect("generate")
        .expect("exists");

    assert_eq!(run.status, ReportStatus::Failed);
    assert!(service.read_artifact(&run).await.is_err());
}

#[tokio::test]
async fn missing_report_is_a_no_op() {
    let harness = Harness::new();
    let result = harness
        .service(100)
        .generate("report-404", BatchSelector::All)
        .await
        .expect("generate");
    assert!(result.is_none());
}

#[tokio::test]
async fn no_stores_produce_header_only_artifact() {
    let harness = Harness::new();
    // 观测存在但门店目录为空
    harness
        .observations
        .insert_observation(StatusObservation {
            store_id: "orphan".to_string(),
            timestamp_utc: anchor(),
            status: StoreStatus::Active,
        })
        .expect("observation");
    harness.create("report-4").await;

    let service = harness.service(100);
    let run = service
        .generate("report-4", BatchSelector::All)
        .await
        .expect("generate")
        .expect("exists");
    assert_eq!(run.status, ReportStatus::Completed);
    let csv = service.read_artifact(&run).await.expect("artifact");
    assert_eq!(String::from_utf8(csv).expect("utf8"), format!("{CSV_HEADER}\n"));
}

#[tokio::test]
async fn trigger_returns_immediately_and_completes_in_background() {
    let harness = Harness::new();
    harness.seed("store-a", &[(10, StoreStatus::Active), (0, StoreStatus::Inactive)]);
    let service = harness.service(100);

    let report_id = service.trigger(BatchSelector::All).await.expect("trigger");
    assert!(!report_id.is_empty());

    let mut status = ReportStatus::Running;
    for _ in 0..200 {
        let run = service
            .get_report(&report_id)
            .await
            .expect("get")
            .expect("exists");
        status = run.status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(status, ReportStatus::Completed);
}

#[tokio::test]
async fn rejected_completion_removes_artifact_and_marks_failed() {
    let harness = Harness::new();
    harness.seed("store-a", &[(10, StoreStatus::Active), (0, StoreStatus::Active)]);
    harness.create("report-5").await;

    let reports = Arc::new(CompletionRejectingStore {
        inner: harness.reports.clone(),
    });
    let artifacts = Arc::new(CsvArtifactSink::new(harness.dir.path()));
    let run = harness
        .service_over(100, reports, artifacts)
        .generate("report-5", BatchSelector::All)
        .await
        .expect("generate")
        .expect("exists");

    assert_eq!(run.status, ReportStatus::Failed);
    assert!(run.artifact_location.is_none());
    assert!(run.completed_at.is_some());
    assert_eq!(harness.reports.saved_batches("report-5"), vec![1]);
    assert_eq!(std::fs::read_dir(harness.dir.path()).expect("dir").count(), 0);
}
