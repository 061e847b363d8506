//! 计算引擎错误。
//!
//! 分类：
//! - 配置错误：InvalidBatchSize / InvalidBatchSelector（运行前判定，不产生任何部分状态）
//! - 无数据：NoData（窗口规划阶段）
//! - 单店计算失败：Aggregation（整次运行失败，不做单店隔离）
//! - 外部边界：Storage（读）/ Persistence（批次落盘）
//!
//! 所有错误对一次报表运行都是终态，引擎内部不重试。

/// 引擎错误。
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("batch size must be > 0")]
    InvalidBatchSize,
    #[error("batch index {index} out of range 1..={total}")]
    InvalidBatchSelector { index: usize, total: usize },
    #[error("no status observations available")]
    NoData,
    #[error("aggregation failed for store {store_id}: {message}")]
    Aggregation { store_id: String, message: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    pub(crate) fn aggregation(store_id: &str, message: impl Into<String>) -> Self {
        EngineError::Aggregation {
            store_id: store_id.to_string(),
            message: message.into(),
        }
    }

    /// 运行开始前即可判定的配置错误。
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidBatchSize | EngineError::InvalidBatchSelector { .. }
        )
    }
}

impl From<uptime_storage::StorageError> for EngineError {
    fn from(err: uptime_storage::StorageError) -> Self {
        EngineError::Storage(err.to_string())
    }
}
