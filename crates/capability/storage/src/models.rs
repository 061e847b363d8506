//! 数据模型
//!
//! 领域类型（门店、营业时间、观测、报表）定义在 `domain`，这里只放存储专用结构：
//! - ReportUpdate：报表终态更新输入
//! - ObservationBounds：全量观测的时间边界

use chrono::{DateTime, Utc};
use domain::ReportStatus;

/// 报表更新输入。
#[derive(Debug, Clone)]
pub struct ReportUpdate {
    pub status: ReportStatus,
    pub artifact_location: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReportUpdate {
    /// 完成：记录产物位置与完成时间。
    pub fn completed(artifact_location: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            status: ReportStatus::Completed,
            artifact_location: Some(artifact_location.into()),
            completed_at: Some(completed_at),
        }
    }

    /// 失败：不带产物。
    pub fn failed(completed_at: DateTime<Utc>) -> Self {
        Self {
            status: ReportStatus::Failed,
            artifact_location: None,
            completed_at: Some(completed_at),
        }
    }
}

/// 全量观测的最早/最晚时间戳。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationBounds {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}
