//! # Uptime Storage 模块
//!
//! 本模块提供在线时长计算所需的数据访问抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：门店目录、状态观测、报表存储的异步 Trait
//! 2. **数据模型层** (`models.rs`)：存储专用结构（报表更新、观测边界）
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **验证辅助层** (`validation.rs`)：标识、时间范围、星期校验
//! 5. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 读写约束
//!
//! - 门店、营业时间、状态观测由外部系统写入，计算过程只读
//! - 报表记录只由报表生命周期管理器写入：创建一次，终态一次
//! - 每批结果单独落盘，单批写入是原子的
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use uptime_storage::{InMemoryObservationStore, ObservationStore};
//!
//! let store = InMemoryObservationStore::new();
//! let bounds = store.observation_bounds().await?;
//! ```

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;
pub mod validation;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

// 导出内存存储实现类型
pub use in_memory::{InMemoryObservationStore, InMemoryReportStore, InMemoryStoreCatalog};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{PgObservationStore, PgReportStore, PgStoreCatalog};
