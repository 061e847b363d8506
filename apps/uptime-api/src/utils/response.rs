//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, internal_error
//! - DTO 转换：report_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应。

use api_contract::{ApiResponse, ReportStatusDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::ReportRun;
use tracing::warn;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 报表不存在
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("REPORT.NOT_FOUND", "report not found")),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(err: impl std::fmt::Display) -> Response {
    let message = err.to_string();
    warn!(target: "uptime.api", error = %message, "request_failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// ReportRun 转 ReportStatusDto
pub fn report_to_dto(run: ReportRun) -> ReportStatusDto {
    ReportStatusDto {
        report_id: run.report_id,
        status: run.status.label().to_string(),
        created_at: run.created_at.to_rfc3339(),
        completed_at: run.completed_at.map(|at| at.to_rfc3339()),
    }
}
