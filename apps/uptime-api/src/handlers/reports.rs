//! 报表 handlers
//!
//! - POST /trigger_report - 触发报表（可选 `{"batchIndex": n}`），立即返回 reportId
//! - GET /get_report/{id} - 运行中/失败返回状态；完成返回 CSV 附件

use crate::AppState;
use crate::utils::response::{bad_request_error, internal_error, not_found_error, report_to_dto};
use api_contract::{ApiResponse, TriggerReportRequest, TriggerReportResponse};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use domain::ReportStatus;
use uptime_engine::BatchSelector;

pub async fn trigger_report(
    State(state): State<AppState>,
    payload: Result<Json<TriggerReportRequest>, JsonRejection>,
) -> Response {
    // 不带 JSON 请求体时按默认参数触发
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => TriggerReportRequest::default(),
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    let selector = BatchSelector::from_index(request.batch_index.or(state.default_batch_index));

    match state.reports.trigger(selector).await {
        Ok(report_id) => (
            StatusCode::OK,
            Json(ApiResponse::success(TriggerReportResponse { report_id })),
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Response {
    let run = match state.reports.get_report(&report_id).await {
        Ok(Some(run)) => run,
        Ok(None) => return not_found_error(),
        Err(err) => return internal_error(err),
    };
    if run.status != ReportStatus::Completed {
        return (StatusCode::OK, Json(ApiResponse::success(report_to_dto(run)))).into_response();
    }

    match state.reports.read_artifact(&run).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"report_{}.csv\"", run.report_id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}
