pub mod data;
pub mod metrics;
pub mod report;

pub use data::{BusinessHoursRule, StatusObservation, StoreRecord, StoreStatus};
pub use metrics::{StoreMetricRow, TimeWindow, WindowLabel};
pub use report::{ReportRun, ReportStatus, TransitionError, check_terminal};

/// 门店未登记时区时使用的默认时区。
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
