//! 报表生命周期管理。
//!
//! 状态机：Running → Completed | Failed。
//! - 触发：生成 report_id，写入 Running 记录，后台执行计算后立即返回
//! - 完成：全部选中批次落盘、产物写出后记录产物位置与完成时间
//! - 失败：任何错误都进入 Failed，不写产物，不自动重试

use crate::artifact::ArtifactSink;
use crate::error::ReportError;
use async_trait::async_trait;
use chrono::Utc;
use domain::{ReportRun, ReportStatus};
use std::sync::Arc;
use tracing::{info, warn};
use uptime_engine::{BatchOrchestrator, BatchOutcome, BatchSelector, BatchSink, EngineError, WindowPlanner};
use uptime_storage::{ReportStore, ReportUpdate, StoreCatalog};

/// 批次落盘：写入报表存储的中间结果表。
pub struct ReportBatchSink {
    reports: Arc<dyn ReportStore>,
    report_id: String,
}

impl ReportBatchSink {
    pub fn new(reports: Arc<dyn ReportStore>, report_id: impl Into<String>) -> Self {
        Self {
            reports,
            report_id: report_id.into(),
        }
    }
}

#[async_trait]
impl BatchSink for ReportBatchSink {
    async fn persist(&self, outcome: &BatchOutcome) -> Result<(), EngineError> {
        self.reports
            .save_batch_rows(&self.report_id, outcome.range.index, &outcome.rows)
            .await
            .map_err(|err| EngineError::Persistence(err.to_string()))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReportService {
    catalog: Arc<dyn StoreCatalog>,
    reports: Arc<dyn ReportStore>,
    planner: Arc<WindowPlanner>,
    orchestrator: BatchOrchestrator,
    artifacts: Arc<dyn ArtifactSink>,
}

impl ReportService {
    pub fn new(
        catalog: Arc<dyn StoreCatalog>,
        reports: Arc<dyn ReportStore>,
        planner: Arc<WindowPlanner>,
        orchestrator: BatchOrchestrator,
        artifacts: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            catalog,
            reports,
            planner,
            orchestrator,
            artifacts,
        }
    }

    /// 创建报表并在后台计算，立即返回 report_id。
    pub async fn trigger(&self, selector: BatchSelector) -> Result<String, ReportError> {
        let report_id = uuid::Uuid::new_v4().to_string();
        self.reports.create_report(&report_id, Utc::now()).await?;
        uptime_telemetry::record_report_triggered();
        info!(
            target: "uptime.report",
            report_id = %report_id,
            selector = ?selector,
            "report_created"
        );

        let service = self.clone();
        let background_id = report_id.clone();
        tokio::spawn(async move {
            if let Err(err) = service.generate(&background_id, selector).await {
                warn!(
                    target: "uptime.report",
                    report_id = %background_id,
                    error = %err,
                    "report_update_failed"
                );
            }
        });
        Ok(report_id)
    }

    /// 执行一次完整计算并写入终态。
    ///
    /// 计算错误记录为 Failed 而不是返回 Err；完成状态写入失败时删除产物并改记 Failed。
    /// 只有 Failed 也无法写入时才返回 Err。
    /// 报表不存在时返回 `Ok(None)`。
    pub async fn generate(
        &self,
        report_id: &str,
        selector: BatchSelector,
    ) -> Result<Option<ReportRun>, ReportError> {
        if self.reports.find_report(report_id).await?.is_none() {
            warn!(target: "uptime.report", report_id = %report_id, "report_missing");
            return Ok(None);
        }

        let err = match self.compute(report_id, selector).await {
            Ok(location) => {
                let update = ReportUpdate::completed(location.clone(), Utc::now());
                match self.reports.update_report(report_id, update).await {
                    Ok(run) => {
                        uptime_telemetry::record_report_completed();
                        info!(
                            target: "uptime.report",
                            report_id = %report_id,
                            location = %location,
                            "report_completed"
                        );
                        return Ok(run);
                    }
                    Err(err) => {
                        // 完成状态未能写入：撤回产物，按失败收尾
                        if let Err(remove_err) = self.artifacts.remove_artifact(&location).await {
                            warn!(
                                target: "uptime.report",
                                report_id = %report_id,
                                location = %location,
                                error = %remove_err,
                                "report_artifact_remove_failed"
                            );
                        }
                        ReportError::from(err)
                    }
                }
            }
            Err(err) => err,
        };

        uptime_telemetry::record_report_failed();
        warn!(
            target: "uptime.report",
            report_id = %report_id,
            error = %err,
            "report_failed"
        );
        Ok(self
            .reports
            .update_report(report_id, ReportUpdate::failed(Utc::now()))
            .await?)
    }

    async fn compute(&self, report_id: &str, selector: BatchSelector) -> Result<String, ReportError> {
        let plan = self.planner.plan().await?;
        let stores = self.catalog.list_stores().await?;
        let sink = ReportBatchSink::new(Arc::clone(&self.reports), report_id);
        let outcome = self.orchestrator.run(&stores, &plan, selector, &sink).await?;
        info!(
            target: "uptime.report",
            report_id = %report_id,
            anchor = %plan.anchor,
            batches = outcome.batches.len(),
            rows = outcome.rows_persisted,
            "report_batches_done"
        );
        let rows = self.reports.list_batch_rows(report_id).await?;
        self.artifacts.write_artifact(report_id, &rows).await
    }

    pub async fn get_report(&self, report_id: &str) -> Result<Option<ReportRun>, ReportError> {
        Ok(self.reports.find_report(report_id).await?)
    }

    /// 读取已完成报表的产物内容。
    pub async fn read_artifact(&self, run: &ReportRun) -> Result<Vec<u8>, ReportError> {
        match (&run.status, &run.artifact_location) {
            (ReportStatus::Completed, Some(location)) => {
                self.artifacts.read_artifact(location).await
            }
            _ => Err(ReportError::Artifact(format!(
                "report {} has no artifact",
                run.report_id
            ))),
        }
    }
}
