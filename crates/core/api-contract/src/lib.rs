//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 触发报表请求体（可选）。
///
/// `batchIndex` 为空表示处理全部批次；否则仅处理该批（从 1 开始）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerReportRequest {
    #[serde(default, alias = "batch_index")]
    pub batch_index: Option<usize>,
}

/// 触发报表响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerReportResponse {
    pub report_id: String,
}

/// 报表状态返回结构（未完成或失败时）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusDto {
    pub report_id: String,
    pub status: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub reports_triggered: u64,
    pub reports_completed: u64,
    pub reports_failed: u64,
    pub batches_completed: u64,
    pub stores_processed: u64,
    pub aggregation_latency_ms_total: u64,
    pub aggregation_latency_ms_count: u64,
}
