//! 计数器快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uptime_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            reports_triggered: snapshot.reports_triggered,
            reports_completed: snapshot.reports_completed,
            reports_failed: snapshot.reports_failed,
            batches_completed: snapshot.batches_completed,
            stores_processed: snapshot.stores_processed,
            aggregation_latency_ms_total: snapshot.aggregation_latency_ms_total,
            aggregation_latency_ms_count: snapshot.aggregation_latency_ms_count,
        })),
    )
        .into_response()
}
