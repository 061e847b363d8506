//! 存储接口 Trait 定义
//!
//! 定义计算引擎依赖的只读数据接口和报表写入接口：
//! - StoreCatalog：门店与营业时间
//! - ObservationStore：状态观测
//! - ReportStore：报表记录与按批落盘的中间结果
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - 计算期间对 StoreCatalog / ObservationStore 只读

use crate::error::StorageError;
use crate::models::{ObservationBounds, ReportUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{BusinessHoursRule, ReportRun, StatusObservation, StoreMetricRow, StoreRecord};

/// 门店目录接口
#[async_trait]
pub trait StoreCatalog: Send + Sync {
    /// 列出全部门店（按 store_id 升序，保证批次划分稳定）
    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError>;

    /// 查找指定门店
    async fn find_store(&self, store_id: &str) -> Result<Option<StoreRecord>, StorageError>;

    /// 列出门店的全部营业时间规则
    async fn list_business_hours(
        &self,
        store_id: &str,
    ) -> Result<Vec<BusinessHoursRule>, StorageError>;
}

/// 状态观测接口
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// 查询门店在 `[start, end]`（闭区间）内的观测，按时间升序
    async fn query_observations(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusObservation>, StorageError>;

    /// 全部门店观测的时间边界，无数据时返回 None
    async fn observation_bounds(&self) -> Result<Option<ObservationBounds>, StorageError>;
}

/// 报表存储接口
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// 创建运行中的报表记录（report_id 重复时报错）
    async fn create_report(
        &self,
        report_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ReportRun, StorageError>;

    /// 查找报表
    async fn find_report(&self, report_id: &str) -> Result<Option<ReportRun>, StorageError>;

    /// 报表进入终态
    ///
    /// 报表不存在返回 `Ok(None)`；已处于终态时返回错误。
    async fn update_report(
        &self,
        report_id: &str,
        update: ReportUpdate,
    ) -> Result<Option<ReportRun>, StorageError>;

    /// 落盘单个批次的结果（同一批次重复写入时覆盖），返回写入行数
    async fn save_batch_rows(
        &self,
        report_id: &str,
        batch_index: usize,
        rows: &[StoreMetricRow],
    ) -> Result<usize, StorageError>;

    /// 按批次顺序读回已落盘的结果
    async fn list_batch_rows(&self, report_id: &str) -> Result<Vec<StoreMetricRow>, StorageError>;
}
