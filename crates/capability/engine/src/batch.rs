//! 批次编排。
//!
//! - 门店按顺序切分为固定大小的批次（最后一批可以更小）
//! - 批次严格串行：上一批落盘后才开始下一批
//! - 批内门店在有界并发池上计算，行顺序与门店顺序一致
//! - 任一门店失败即中止整次运行，已落盘的批次不回滚

use crate::aggregate::{IntervalAggregator, UptimeMinutes};
use crate::calendar::CalendarResolver;
use crate::error::EngineError;
use crate::progress::ProgressTracker;
use crate::window::WindowPlan;
use async_trait::async_trait;
use domain::{StoreMetricRow, StoreRecord};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// 批次选择：全部批次或单个批次（从 1 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchSelector {
    #[default]
    All,
    Single(usize),
}

impl BatchSelector {
    /// `None` 表示全部批次。
    pub fn from_index(index: Option<usize>) -> Self {
        index.map(BatchSelector::Single).unwrap_or_default()
    }
}

/// 批次在门店序列中的范围 `[start, end)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    /// 从 1 开始。
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl BatchRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub fn total_batches(store_count: usize, batch_size: usize) -> usize {
    store_count.div_ceil(batch_size.max(1))
}

/// 计算需要处理的批次。
///
/// `batch_size == 0` 或批次序号越界均为配置错误，不处理任何批次。
pub fn plan_batches(
    store_count: usize,
    batch_size: usize,
    selector: BatchSelector,
) -> Result<Vec<BatchRange>, EngineError> {
    if batch_size == 0 {
        return Err(EngineError::InvalidBatchSize);
    }
    let total = total_batches(store_count, batch_size);
    let range = |index: usize| BatchRange {
        index,
        start: (index - 1) * batch_size,
        end: (index * batch_size).min(store_count),
    };
    match selector {
        BatchSelector::All => Ok((1..=total).map(range).collect()),
        BatchSelector::Single(index) if (1..=total).contains(&index) => Ok(vec![range(index)]),
        BatchSelector::Single(index) => Err(EngineError::InvalidBatchSelector { index, total }),
    }
}

/// 保留两位小数（四舍五入，远离零）。
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 由三窗口分钟数生成报表行：小时窗口保持分钟，天、周窗口换算为小时后再取整。
pub fn build_row(
    store_id: &str,
    hour: UptimeMinutes,
    day: UptimeMinutes,
    week: UptimeMinutes,
) -> StoreMetricRow {
    StoreMetricRow {
        store_id: store_id.to_string(),
        uptime_last_hour: round2(hour.active),
        uptime_last_day: round2(day.active / 60.0),
        uptime_last_week: round2(week.active / 60.0),
        downtime_last_hour: round2(hour.inactive),
        downtime_last_day: round2(day.inactive / 60.0),
        downtime_last_week: round2(week.inactive / 60.0),
    }
}

/// 编排参数。
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub batch_size: usize,
    /// 批内并发上限。
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// 已完成批次。
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub range: BatchRange,
    /// 本次运行选中的批次数。
    pub total_batches: usize,
    pub rows: Vec<StoreMetricRow>,
}

/// 批次落盘边界。
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn persist(&self, outcome: &BatchOutcome) -> Result<(), EngineError>;
}

/// 一次运行的结果。
///
/// 行数据只经由 [`BatchSink`] 交出，内存中最多保留一个批次的结果。
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub batches: Vec<BatchRange>,
    pub rows_persisted: usize,
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    resolver: Arc<CalendarResolver>,
    aggregator: Arc<IntervalAggregator>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        resolver: Arc<CalendarResolver>,
        aggregator: Arc<IntervalAggregator>,
        config: BatchConfig,
    ) -> Self {
        Self {
            resolver,
            aggregator,
            config,
        }
    }

    pub fn config(&self) -> BatchConfig {
        self.config
    }

    /// 处理选中的批次，每批计算完成后先交给 `sink` 落盘再继续。
    pub async fn run(
        &self,
        stores: &[StoreRecord],
        plan: &WindowPlan,
        selector: BatchSelector,
        sink: &dyn BatchSink,
    ) -> Result<RunOutcome, EngineError> {
        let batches = plan_batches(stores.len(), self.config.batch_size, selector)?;
        let mut tracker = ProgressTracker::start(batches.len());
        let mut rows_persisted = 0;

        for range in &batches {
            let batch_rows = self.run_batch(&stores[range.start..range.end], plan).await?;
            let outcome = BatchOutcome {
                range: *range,
                total_batches: batches.len(),
                rows: batch_rows,
            };
            sink.persist(&outcome).await?;
            uptime_telemetry::record_batch_completed();
            uptime_telemetry::record_stores_processed(range.len() as u64);

            let progress = tracker.batch_completed();
            info!(
                target: "uptime.engine",
                batch_index = range.index,
                stores = range.len(),
                completed = progress.completed,
                total = progress.total,
                elapsed_ms = progress.elapsed.as_millis() as u64,
                estimated_total_ms = progress.estimated_total.map(|d| d.as_millis() as u64),
                remaining_ms = progress.remaining.map(|d| d.as_millis() as u64),
                "batch_completed"
            );
            rows_persisted += outcome.rows.len();
        }

        Ok(RunOutcome {
            batches,
            rows_persisted,
        })
    }

    /// 批内并发计算；先获取许可再 spawn，在途任务数不超过并发上限。
    async fn run_batch(
        &self,
        stores: &[StoreRecord],
        plan: &WindowPlan,
    ) -> Result<Vec<StoreMetricRow>, EngineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut set = JoinSet::new();
        let mut owners = HashMap::new();

        for (position, store) in stores.iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|err| EngineError::aggregation(&store.store_id, err.to_string()))?;
            let resolver = Arc::clone(&self.resolver);
            let aggregator = Arc::clone(&self.aggregator);
            let store_id = store.store_id.clone();
            let plan = *plan;
            let handle = set.spawn(async move {
                let _permit = permit;
                let started = Instant::now();
                let result = compute_store_row(&resolver, &aggregator, &store_id, &plan).await;
                uptime_telemetry::record_aggregation_latency_ms(started.elapsed().as_millis() as u64);
                (position, result)
            });
            owners.insert(handle.id(), store.store_id.clone());
        }

        let mut slots: Vec<Option<StoreMetricRow>> = vec![None; stores.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((position, Ok(row))) => slots[position] = Some(row),
                Ok((_, Err(err))) => {
                    set.abort_all();
                    return Err(err);
                }
                Err(err) => {
                    set.abort_all();
                    let store_id = owners.get(&err.id()).cloned().unwrap_or_default();
                    return Err(EngineError::Aggregation {
                        store_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        slots
            .into_iter()
            .zip(stores)
            .map(|(slot, store)| {
                slot.ok_or_else(|| EngineError::aggregation(&store.store_id, "missing result"))
            })
            .collect()
    }
}

/// 单店计算：解析日历后聚合三个窗口。任何错误都归为该门店的聚合失败。
pub async fn compute_store_row(
    resolver: &CalendarResolver,
    aggregator: &IntervalAggregator,
    store_id: &str,
    plan: &WindowPlan,
) -> Result<StoreMetricRow, EngineError> {
    let calendar = resolver.resolve(store_id).await.map_err(|err| match err {
        EngineError::Aggregation { .. } => err,
        other => EngineError::aggregation(store_id, other.to_string()),
    })?;
    let minutes = aggregator.aggregate_windows(&calendar, plan).await?;
    Ok(build_row(
        store_id,
        minutes.last_hour,
        minutes.last_day,
        minutes.last_week,
    ))
}
