//! 时间窗口与门店指标行。

use chrono::{DateTime, Duration, Utc};

/// 统计窗口标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLabel {
    LastHour,
    LastDay,
    LastWeek,
}

impl WindowLabel {
    /// 窗口长度。
    pub fn span(&self) -> Duration {
        match self {
            WindowLabel::LastHour => Duration::hours(1),
            WindowLabel::LastDay => Duration::days(1),
            WindowLabel::LastWeek => Duration::weeks(1),
        }
    }
}

/// 绝对时间窗口（UTC，闭区间）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub label: WindowLabel,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// 以 `end` 为锚点向前推一个窗口长度。
    pub fn ending_at(label: WindowLabel, end: DateTime<Utc>) -> Self {
        Self {
            label,
            start: end - label.span(),
            end,
        }
    }

    /// 窗口总时长（分钟）。
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 60_000.0
    }
}

/// 单个门店的报表行。
///
/// 小时窗口单位为分钟；天、周窗口单位为小时。
#[derive(Debug, Clone, PartialEq)]
pub struct StoreMetricRow {
    pub store_id: String,
    pub uptime_last_hour: f64,
    pub uptime_last_day: f64,
    pub uptime_last_week: f64,
    pub downtime_last_hour: f64,
    pub downtime_last_day: f64,
    pub downtime_last_week: f64,
}
