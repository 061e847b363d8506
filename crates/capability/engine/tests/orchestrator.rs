use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{BusinessHoursRule, StatusObservation, StoreMetricRow, StoreRecord, StoreStatus};
use std::sync::{Arc, Mutex};
use uptime_engine::{
    BatchConfig, BatchOrchestrator, BatchOutcome, BatchSelector, BatchSink, CalendarResolver,
    EngineError, IntervalAggregator, StoreCalendar, WindowPlanner,
};
use uptime_storage::{InMemoryObservationStore, InMemoryStoreCatalog, StoreCatalog};

struct Fixture {
    catalog: Arc<InMemoryStoreCatalog>,
    observations: Arc<InMemoryObservationStore>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            catalog: Arc::new(InMemoryStoreCatalog::new()),
            observations: Arc::new(InMemoryObservationStore::new()),
        }
    }

    fn store(&self, store_id: &str, timezone: Option<&str>) {
        self.catalog
            .insert_store(StoreRecord {
                store_id: store_id.to_string(),
                timezone: timezone.map(str::to_string),
            })
            .expect("store");
    }

    fn observe(&self, store_id: &str, ts: DateTime<Utc>, status: StoreStatus) {
        self.observations
            .insert_observation(StatusObservation {
                store_id: store_id.to_string(),
                timestamp_utc: ts,
                status,
            })
            .expect("observation");
    }

    fn orchestrator(&self, batch_size: usize, concurrency: usize) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::new(CalendarResolver::new(self.catalog.clone(), Tz::UTC)),
            Arc::new(IntervalAggregator::new(self.observations.clone())),
            BatchConfig {
                batch_size,
                concurrency,
            },
        )
    }

    fn aggregator(&self) -> IntervalAggregator {
        IntervalAggregator::new(self.observations.clone())
    }

    fn planner(&self) -> WindowPlanner {
        WindowPlanner::new(self.observations.clone())
    }
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<(usize, Vec<StoreMetricRow>)>>,
}

impl RecordingSink {
    fn batch_indexes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(|(index, _)| *index).collect()
    }

    /// 全部已落盘行，按落盘顺序展开。
    fn rows(&self) -> Vec<StoreMetricRow> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, rows)| rows.clone())
            .collect()
    }

    fn store_ids(&self) -> Vec<String> {
        self.rows().into_iter().map(|row| row.store_id).collect()
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    async fn persist(&self, outcome: &BatchOutcome) -> Result<(), EngineError> {
        self.batches
            .lock()
            .unwrap()
            .push((outcome.range.index, outcome.rows.clone()));
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl BatchSink for FailingSink {
    async fn persist(&self, _outcome: &BatchOutcome) -> Result<(), EngineError> {
        Err(EngineError::Persistence("disk full".to_string()))
    }
}

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

fn seed_stores(fixture: &Fixture, count: usize) -> Vec<String> {
    let ids: Vec<String> = (1..=count).map(|i| format!("store-{i:03}")).collect();
    for (i, id) in ids.iter().enumerate() {
        fixture.store(id, None);
        // 每家门店在线分钟数不同，用于校验行顺序
        fixture.observe(id, anchor() - Duration::minutes(30), StoreStatus::Active);
        fixture.observe(id, anchor() - Duration::minutes(30 - (i as i64 % 30)), StoreStatus::Inactive);
    }
    ids
}

#[tokio::test]
async fn planner_fails_without_observations() {
    let fixture = Fixture::new();
    let err = fixture.planner().plan().await.expect_err("no data");
    assert!(matches!(err, EngineError::NoData));
}

#[tokio::test]
async fn planner_anchors_on_latest_observation() {
    let fixture = Fixture::new();
    fixture.observe("store-b", anchor(), StoreStatus::Active);
    fixture.observe("store-a", anchor() - Duration::days(3), StoreStatus::Active);
    let plan = fixture.planner().plan().await.expect("plan");
    assert_eq!(plan.anchor, anchor());
    assert_eq!(plan.last_hour.start, anchor() - Duration::hours(1));
}

#[tokio::test]
async fn all_batches_are_persisted_in_order() {
    let fixture = Fixture::new();
    let ids = seed_stores(&fixture, 25);
    let stores = fixture.catalog.list_stores().await.expect("stores");
    let plan = fixture.planner().plan().await.expect("plan");
    let sink = RecordingSink::default();

    let outcome = fixture
        .orchestrator(10, 4)
        .run(&stores, &plan, BatchSelector::All, &sink)
        .await
        .expect("run");

    assert_eq!(outcome.batches.len(), 3);
    assert_eq!(outcome.rows_persisted, 25);
    assert_eq!(sink.store_ids(), ids);
    assert_eq!(sink.batch_indexes(), vec![1, 2, 3]);

    for (i, row) in sink.rows().iter().enumerate() {
        assert_eq!(row.uptime_last_hour, (i % 30) as f64);
        assert!(row.uptime_last_hour + row.downtime_last_hour <= 60.0);
    }
}

#[tokio::test]
async fn single_batch_processes_only_its_stores() {
    let fixture = Fixture::new();
    let ids = seed_stores(&fixture, 250);
    let stores = fixture.catalog.list_stores().await.expect("stores");
    let plan = fixture.planner().plan().await.expect("plan");
    let sink = RecordingSink::default();

    let outcome = fixture
        .orchestrator(100, 8)
        .run(&stores, &plan, BatchSelector::Single(2), &sink)
        .await
        .expect("run");

    assert_eq!(outcome.rows_persisted, 100);
    assert_eq!(sink.store_ids(), ids[100..200].to_vec());
    assert_eq!(sink.batch_indexes(), vec![2]);

    let err = fixture
        .orchestrator(100, 8)
        .run(&stores, &plan, BatchSelector::Single(4), &sink)
        .await
        .expect_err("out of range");
    assert!(err.is_configuration());
    assert_eq!(sink.batch_indexes(), vec![2]);
}

#[tokio::test]
async fn failing_store_aborts_the_run() {
    let fixture = Fixture::new();
    seed_stores(&fixture, 15);
    // 第二批中的门店时区非法
    fixture.store("store-012", Some("Mars/Olympus"));
    let stores = fixture.catalog.list_stores().await.expect("stores");
    let plan = fixture.planner().plan().await.expect("plan");
    let sink = RecordingSink::default();

    let err = fixture
        .orchestrator(10, 4)
        .run(&stores, &plan, BatchSelector::All, &sink)
        .await
        .expect_err("bad timezone");

    match err {
        EngineError::Aggregation { store_id, .. } => assert_eq!(store_id, "store-012"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sink.batch_indexes(), vec![1]);
}

#[tokio::test]
async fn sink_failure_is_a_persistence_error() {
    let fixture = Fixture::new();
    let stores: Vec<StoreRecord> = seed_stores(&fixture, 3)
        .into_iter()
        .map(|store_id| StoreRecord {
            store_id,
            timezone: None,
        })
        .collect();
    let plan = fixture.planner().plan().await.expect("plan");
    let err = fixture
        .orchestrator(100, 2)
        .run(&stores, &plan, BatchSelector::All, &FailingSink)
        .await
        .expect_err("sink");
    assert!(matches!(err, EngineError::Persistence(_)));
}

#[tokio::test]
async fn business_hours_limit_accumulation_per_store() {
    let fixture = Fixture::new();
    fixture.store("open", None);
    fixture.store("closed", None);
    // 2024-01-03 周三；closed 仅周一营业
    fixture
        .catalog
        .insert_business_hours(BusinessHoursRule {
            store_id: "closed".to_string(),
            day_of_week: 0,
            start_time_local: "09:00".to_string(),
            end_time_local: "17:00".to_string(),
        })
        .expect("rule");
    for store_id in ["open", "closed"] {
        fixture.observe(store_id, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap(), StoreStatus::Active);
        fixture.observe(store_id, Utc.with_ymd_and_hms(2024, 1, 3, 10, 30, 0).unwrap(), StoreStatus::Inactive);
        fixture.observe(store_id, Utc.with_ymd_and_hms(2024, 1, 3, 10, 45, 0).unwrap(), StoreStatus::Active);
    }
    let stores = fixture.catalog.list_stores().await.expect("stores");
    let plan = fixture.planner().plan().await.expect("plan");

    let sink = RecordingSink::default();
    fixture
        .orchestrator(100, 2)
        .run(&stores, &plan, BatchSelector::All, &sink)
        .await
        .expect("run");

    // list_stores 按 store_id 排序：closed, open
    let rows = sink.rows();
    let closed = &rows[0];
    let open = &rows[1];
    assert_eq!(closed.store_id, "closed");
    assert_eq!((closed.uptime_last_hour, closed.downtime_last_hour), (0.0, 0.0));
    assert_eq!((open.uptime_last_hour, open.downtime_last_hour), (30.0, 15.0));
    assert_eq!(open.uptime_last_day, 0.5);
    assert_eq!(open.downtime_last_week, 0.25);
}

#[tokio::test]
async fn sliced_windows_match_per_window_queries() {
    let fixture = Fixture::new();
    let end = anchor();
    // 观测恰好落在周、天、小时窗口的起点与锚点上
    for (ts, status) in [
        (end - Duration::weeks(1), StoreStatus::Inactive),
        (end - Duration::days(1), StoreStatus::Active),
        (end - Duration::hours(3), StoreStatus::Inactive),
        (end - Duration::hours(1), StoreStatus::Active),
        (end - Duration::minutes(10), StoreStatus::Inactive),
        (end, StoreStatus::Active),
    ] {
        fixture.observe("store-1", ts, status);
    }
    let plan = fixture.planner().plan().await.expect("plan");
    assert_eq!(plan.anchor, end);
    let calendar = StoreCalendar::always_open("store-1", Tz::UTC);
    let aggregator = fixture.aggregator();

    let sliced = aggregator
        .aggregate_windows(&calendar, &plan)
        .await
        .expect("windows");
    assert_eq!(
        sliced.last_hour,
        aggregator.aggregate(&calendar, &plan.last_hour).await.expect("hour")
    );
    assert_eq!(
        sliced.last_day,
        aggregator.aggregate(&calendar, &plan.last_day).await.expect("day")
    );
    assert_eq!(
        sliced.last_week,
        aggregator.aggregate(&calendar, &plan.last_week).await.expect("week")
    );

    // 起点上的观测与下一条观测之间的间隔整段计入，不按窗口裁剪
    assert_eq!((sliced.last_hour.active, sliced.last_hour.inactive), (50.0, 10.0));
    assert_eq!(sliced.last_hour.total(), plan.last_hour.duration_minutes());
    assert_eq!((sliced.last_day.active, sliced.last_day.inactive), (1310.0, 130.0));
    assert_eq!((sliced.last_week.active, sliced.last_week.inactive), (1310.0, 8770.0));
}

#[tokio::test]
async fn gap_before_window_start_is_excluded_not_clipped() {
    let fixture = Fixture::new();
    let end = anchor();
    // 起点在小时窗口之外的间隔不计入小时窗口，也不会被截成窗口内的一段
    fixture.observe("store-1", end - Duration::minutes(90), StoreStatus::Active);
    fixture.observe("store-1", end - Duration::minutes(30), StoreStatus::Inactive);
    fixture.observe("store-1", end, StoreStatus::Active);
    let plan = fixture.planner().plan().await.expect("plan");
    let calendar = StoreCalendar::always_open("store-1", Tz::UTC);

    let minutes = fixture
        .aggregator()
        .aggregate(&calendar, &plan.last_hour)
        .await
        .expect("hour");
    assert_eq!((minutes.active, minutes.inactive), (0.0, 30.0));
}
