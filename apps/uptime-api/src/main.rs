//! 门店在线时长报表 HTTP 服务。
//!
//! 触发报表、查询状态、下载 CSV，附带健康检查与计数器快照。

mod handlers;
mod middleware;
mod routes;
mod utils;

use axum::{Router, middleware as axum_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uptime_config::AppConfig;
use uptime_engine::{
    BatchConfig, BatchOrchestrator, CalendarResolver, IntervalAggregator, WindowPlanner,
    parse_timezone,
};
use uptime_report::{CsvArtifactSink, ReportService};
use uptime_storage::{PgObservationStore, PgReportStore, PgStoreCatalog, connect_pool_with};
use uptime_telemetry::init_tracing;

#[derive(Clone)]
pub struct AppState {
    pub reports: ReportService,
    /// 请求未指定批次时使用（UPTIME_BATCH_INDEX）。
    pub default_batch_index: Option<usize>,
}

/// 组装路由：同时挂载 / 与 /api/ 前缀，外层注入 request_id/trace_id。
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_api_router())
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::request_context))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let default_timezone = parse_timezone(&config.default_timezone)?;
    // Postgres 存储（需先执行 migrations）
    let pool = connect_pool_with(&config.database_url, config.db_max_connections).await?;
    let catalog = Arc::new(PgStoreCatalog::new(pool.clone()));
    let observations = Arc::new(PgObservationStore::new(pool.clone()));
    let report_store = Arc::new(PgReportStore::new(pool));

    let orchestrator = BatchOrchestrator::new(
        Arc::new(CalendarResolver::new(catalog.clone(), default_timezone)),
        Arc::new(IntervalAggregator::new(observations.clone())),
        BatchConfig {
            batch_size: config.batch_size,
            concurrency: config.worker_concurrency,
        },
    );
    let reports = ReportService::new(
        catalog,
        report_store,
        Arc::new(WindowPlanner::new(observations)),
        orchestrator,
        Arc::new(CsvArtifactSink::new(&config.reports_dir)),
    );
    let state = AppState {
        reports,
        default_batch_index: config.batch_index,
    };

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "uptime.api",
        addr = %config.http_addr,
        reports_dir = %config.reports_dir,
        batch_size = config.batch_size,
        "server_listening"
    );
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}
