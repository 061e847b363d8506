//! 追踪、请求 ID 与报表计算计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub reports_triggered: u64,
    pub reports_completed: u64,
    pub reports_failed: u64,
    pub batches_completed: u64,
    pub stores_processed: u64,
    pub aggregation_latency_ms_total: u64,
    pub aggregation_latency_ms_count: u64,
}

/// 进程内计数器。
pub struct TelemetryMetrics {
    reports_triggered: AtomicU64,
    reports_completed: AtomicU64,
    reports_failed: AtomicU64,
    batches_completed: AtomicU64,
    stores_processed: AtomicU64,
    aggregation_latency_ms_total: AtomicU64,
    aggregation_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            reports_triggered: AtomicU64::new(0),
            reports_completed: AtomicU64::new(0),
            reports_failed: AtomicU64::new(0),
            batches_completed: AtomicU64::new(0),
            stores_processed: AtomicU64::new(0),
            aggregation_latency_ms_total: AtomicU64::new(0),
            aggregation_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reports_triggered: self.reports_triggered.load(Ordering::Relaxed),
            reports_completed: self.reports_completed.load(Ordering::Relaxed),
            reports_failed: self.reports_failed.load(Ordering::Relaxed),
            batches_completed: self.batches_completed.load(Ordering::Relaxed),
            stores_processed: self.stores_processed.load(Ordering::Relaxed),
            aggregation_latency_ms_total: self
                .aggregation_latency_ms_total
                .load(Ordering::Relaxed),
            aggregation_latency_ms_count: self
                .aggregation_latency_ms_count
                .load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录报表触发次数。
pub fn record_report_triggered() {
    metrics().reports_triggered.fetch_add(1, Ordering::Relaxed);
}

/// 记录报表完成次数。
pub fn record_report_completed() {
    metrics().reports_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录报表失败次数。
pub fn record_report_failed() {
    metrics().reports_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录批次落盘次数。
pub fn record_batch_completed() {
    metrics().batches_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录已计算门店数。
pub fn record_stores_processed(count: u64) {
    metrics()
        .stores_processed
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录单店聚合耗时（毫秒，包含日历解析与观测读取）。
pub fn record_aggregation_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .aggregation_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .aggregation_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
