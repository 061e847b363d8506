//! # Uptime Engine
//!
//! 门店在线时长计算核心：
//!
//! 1. **营业日历** (`calendar.rs`)：时区 + 按星期分组的营业时段，缺省为全天营业
//! 2. **区间聚合** (`aggregate.rs`)：相邻观测间隔按起点状态累加分钟数
//! 3. **窗口规划** (`window.rs`)：以最晚观测为锚点的小时/天/周窗口
//! 4. **批次编排** (`batch.rs`)：分批、批内有界并发、逐批落盘
//! 5. **进度估算** (`progress.rs`)
//!
//! 计算期间对门店目录与观测存储只读；唯一的写入通过 [`BatchSink`] 完成。

pub mod aggregate;
pub mod batch;
pub mod calendar;
pub mod error;
pub mod progress;
pub mod window;

pub use aggregate::{IntervalAggregator, UptimeMinutes, WindowMinutes, accumulate};
pub use batch::{
    BatchConfig, BatchOrchestrator, BatchOutcome, BatchRange, BatchSelector, BatchSink,
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, RunOutcome, build_row,
    compute_store_row, plan_batches, round2, total_batches,
};
pub use calendar::{CalendarResolver, LocalTimeRange, StoreCalendar, parse_timezone};
pub use error::EngineError;
pub use progress::{ProgressSnapshot, ProgressTracker, estimate};
pub use window::{WindowPlan, WindowPlanner};
