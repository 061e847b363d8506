//! 路由定义
//!
//! - 健康检查：/health
//! - 报表：/trigger_report, /get_report/:report_id
//! - 计数器快照：/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由（由调用方挂载到 / 与 /api/ 前缀）
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/trigger_report", post(trigger_report))
        .route("/get_report/:report_id", get(get_report))
        .route("/metrics", get(get_metrics))
}
