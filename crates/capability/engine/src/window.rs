//! 时间窗口规划。
//!
//! 窗口终点取全部观测中最大的时间戳（数据锚点），不使用当前时钟。

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use domain::{TimeWindow, WindowLabel};
use std::sync::Arc;
use uptime_storage::ObservationStore;

/// 三个统计窗口（终点相同）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    pub anchor: DateTime<Utc>,
    pub last_hour: TimeWindow,
    pub last_day: TimeWindow,
    pub last_week: TimeWindow,
}

impl WindowPlan {
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            last_hour: TimeWindow::ending_at(WindowLabel::LastHour, anchor),
            last_day: TimeWindow::ending_at(WindowLabel::LastDay, anchor),
            last_week: TimeWindow::ending_at(WindowLabel::LastWeek, anchor),
        }
    }

    /// 以给定时间戳中的最大值为锚点；输入为空返回 None。
    pub fn from_timestamps<I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        timestamps.into_iter().max().map(Self::anchored_at)
    }

    pub fn windows(&self) -> [TimeWindow; 3] {
        [self.last_hour, self.last_day, self.last_week]
    }

    /// 最宽窗口（周）的起点。
    pub fn widest_start(&self) -> DateTime<Utc> {
        self.last_week.start
    }
}

/// 窗口规划器。
pub struct WindowPlanner {
    observations: Arc<dyn ObservationStore>,
}

impl WindowPlanner {
    pub fn new(observations: Arc<dyn ObservationStore>) -> Self {
        Self { observations }
    }

    /// 全量数据无观测时返回 [`EngineError::NoData`]。
    pub async fn plan(&self) -> Result<WindowPlan, EngineError> {
        let bounds = self
            .observations
            .observation_bounds()
            .await?
            .ok_or(EngineError::NoData)?;
        Ok(WindowPlan::anchored_at(bounds.latest))
    }
}
