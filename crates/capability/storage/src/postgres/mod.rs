//! # PostgreSQL 存储实现模块
//!
//! 本模块提供所有存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 包含的实现
//!
//! - **StoreCatalog** (`store.rs`)：门店与营业时间
//! - **ObservationStore** (`observation.rs`)：状态观测（范围查询 + 全局边界）
//! - **ReportStore** (`report.rs`)：报表记录与按批结果
//!
//! ## 数据库模式要求
//!
//! 见 `migrations/0001_init.sql`：
//! - `stores`：门店表（store_id, timezone）
//! - `business_hours`：营业时间表（store_id, day_of_week, start_time_local, end_time_local）
//! - `store_status`：状态观测表（store_id, timestamp_utc, status）
//! - `reports`：报表表（report_id, status, file_path, created_at, completed_at）
//! - `report_rows`：按批落盘的报表行（report_id, batch_index, position, ...）
//!
//! ## 索引
//! - `idx_store_status_store_ts`：(store_id, timestamp_utc)，区间查询与排序
//! - `idx_business_hours_store`：(store_id)
//!
//! ## 错误处理
//!
//! - `sqlx::Error` 自动转换为 `StorageError`
//! - 脏数据（未知状态字符串、越界星期）直接返回 `StorageError`，由上层决定失败策略
//!
//! ## 事务
//!
//! - 单批结果写入使用事务：先删后插，保证每批落盘原子
//! - 报表终态更新使用 `status = 'running'` 条件更新，保证状态单调

pub mod observation;
pub mod report;
pub mod store;

pub use observation::*;
pub use report::*;
pub use store::*;
