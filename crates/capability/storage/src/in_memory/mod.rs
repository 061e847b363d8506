//! 内存存储实现模块
//!
//! 仅用于本地演示和测试。
//!
//! 包含以下实现：
//! - StoreCatalog: InMemoryStoreCatalog
//! - ObservationStore: InMemoryObservationStore
//! - ReportStore: InMemoryReportStore

pub mod observation;
pub mod report;
pub mod store;

pub use observation::*;
pub use report::*;
pub use store::*;
