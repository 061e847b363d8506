//! 报表内存实现
//!
//! 报表记录与按批结果分别保存；状态迁移规则由 `ReportRun::transition` 保证。

use crate::error::StorageError;
use crate::models::ReportUpdate;
use crate::traits::ReportStore;
use crate::validation::ensure_id;
use chrono::{DateTime, Utc};
use domain::{ReportRun, StoreMetricRow};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// 报表内存存储
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<String, ReportRun>>,
    batches: RwLock<HashMap<String, BTreeMap<usize, Vec<StoreMetricRow>>>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
            batches: RwLock::new(HashMap::new()),
        }
    }

    /// 已落盘的批次编号（用于测试）
    pub fn saved_batches(&self, report_id: &str) -> Vec<usize> {
        self.batches
            .read()
            .ok()
            .and_then(|map| map.get(report_id).map(|b| b.keys().copied().collect()))
            .unwrap_or_default()
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportStore for InMemoryReportStore {
    async fn create_report(
        &self,
        report_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ReportRun, StorageError> {
        ensure_id(report_id, "report_id")?;
        let mut reports = self
            .reports
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if reports.contains_key(report_id) {
            return Err(StorageError::new("report exists"));
        }
        let run = ReportRun::new(report_id, created_at);
        reports.insert(report_id.to_string(), run.clone());
        Ok(run)
    }

    async fn find_report(&self, report_id: &str) -> Result<Option<ReportRun>, StorageError> {
        let reports = self
            .reports
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(reports.get(report_id).cloned())
    }

    async fn update_report(
        &self,
        report_id: &str,
        update: ReportUpdate,
    ) -> Result<Option<ReportRun>, StorageError> {
        let mut reports = self
            .reports
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(run) = reports.get_mut(report_id) else {
            return Ok(None);
        };
        let completed_at = update.completed_at.unwrap_or_else(Utc::now);
        run.transition(update.status, update.artifact_location, completed_at)?;
        Ok(Some(run.clone()))
    }

    async fn save_batch_rows(
        &self,
        report_id: &str,
        batch_index: usize,
        rows: &[StoreMetricRow],
    ) -> Result<usize, StorageError> {
        ensure_id(report_id, "report_id")?;
        let mut batches = self
            .batches
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        batches
            .entry(report_id.to_string())
            .or_default()
            .insert(batch_index, rows.to_vec());
        Ok(rows.len())
    }

    async fn list_batch_rows(&self, report_id: &str) -> Result<Vec<StoreMetricRow>, StorageError> {
        let batches = self
            .batches
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(batches
            .get(report_id)
            .map(|map| map.values().flatten().cloned().collect())
            .unwrap_or_default())
    }
}
