//! 报表生命周期错误。

use uptime_engine::EngineError;
use uptime_storage::StorageError;

/// 报表错误。
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("artifact error: {0}")]
    Artifact(String),
}

impl From<StorageError> for ReportError {
    fn from(err: StorageError) -> Self {
        ReportError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Artifact(err.to_string())
    }
}
