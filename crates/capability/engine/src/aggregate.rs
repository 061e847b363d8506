//! 区间聚合。
//!
//! 相邻两条观测之间的间隔视为状态恒定（取起点观测的状态）。
//! 起点观测的本地时间不在营业时间内时，整段间隔忽略；
//! 间隔不会在营业时间边界处切分。

use crate::calendar::StoreCalendar;
use crate::error::EngineError;
use crate::window::WindowPlan;
use domain::{StatusObservation, StoreStatus, TimeWindow};
use std::sync::Arc;
use uptime_storage::ObservationStore;

/// 单个窗口内的在线/离线分钟数（保留小数）。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UptimeMinutes {
    pub active: f64,
    pub inactive: f64,
}

impl UptimeMinutes {
    pub fn total(&self) -> f64 {
        self.active + self.inactive
    }
}

/// 三个窗口的聚合结果。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowMinutes {
    pub last_hour: UptimeMinutes,
    pub last_day: UptimeMinutes,
    pub last_week: UptimeMinutes,
}

/// 对已按时间升序排列的观测累加在线/离线分钟数。
pub fn accumulate(observations: &[StatusObservation], calendar: &StoreCalendar) -> UptimeMinutes {
    let mut minutes = UptimeMinutes::default();
    for pair in observations.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if !calendar.is_open_at(current.timestamp_utc) {
            continue;
        }
        let diff = (next.timestamp_utc - current.timestamp_utc).num_milliseconds() as f64 / 60_000.0;
        match current.status {
            StoreStatus::Active => minutes.active += diff,
            StoreStatus::Inactive => minutes.inactive += diff,
        }
    }
    minutes
}

/// 区间聚合器：从观测存储读取数据后交给 [`accumulate`]。
pub struct IntervalAggregator {
    observations: Arc<dyn ObservationStore>,
}

impl IntervalAggregator {
    pub fn new(observations: Arc<dyn ObservationStore>) -> Self {
        Self { observations }
    }

    /// 单窗口聚合。
    pub async fn aggregate(
        &self,
        calendar: &StoreCalendar,
        window: &TimeWindow,
    ) -> Result<UptimeMinutes, EngineError> {
        let observations = self
            .observations
            .query_observations(&calendar.store_id, window.start, window.end)
            .await
            .map_err(|err| EngineError::aggregation(&calendar.store_id, err.to_string()))?;
        Ok(accumulate(&observations, calendar))
    }

    /// 三窗口聚合。
    ///
    /// 只读取一次最宽窗口的观测，较窄窗口按起点切片；
    /// 三个窗口终点相同，切片结果与逐窗口查询一致。
    pub async fn aggregate_windows(
        &self,
        calendar: &StoreCalendar,
        plan: &WindowPlan,
    ) -> Result<WindowMinutes, EngineError> {
        let observations = self
            .observations
            .query_observations(&calendar.store_id, plan.widest_start(), plan.anchor)
            .await
            .map_err(|err| EngineError::aggregation(&calendar.store_id, err.to_string()))?;
        let within = |window: &TimeWindow| {
            let from = observations.partition_point(|obs| obs.timestamp_utc < window.start);
            let to = observations.partition_point(|obs| obs.timestamp_utc <= window.end);
            accumulate(&observations[from..to.max(from)], calendar)
        };
        Ok(WindowMinutes {
            last_hour: within(&plan.last_hour),
            last_day: within(&plan.last_day),
            last_week: within(&plan.last_week),
        })
    }
}
