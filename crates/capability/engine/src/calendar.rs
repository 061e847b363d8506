//! 营业日历解析。
//!
//! 每个门店解析出一个时区和按星期分组的营业时段：
//! - 门店无记录或时区为空：使用默认时区
//! - 门店无任何营业时间规则：视为全天营业（每天 00:00–23:59）
//!
//! 判断某一时刻是否在营业时间内：换算到本地时间，截断到分钟，
//! 与当天任一时段比较，两端均包含（start <= t <= end）。

use crate::error::EngineError;
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use domain::BusinessHoursRule;
use std::sync::Arc;
use uptime_storage::StoreCatalog;

/// 本地时段（闭区间，分钟精度比较）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LocalTimeRange {
    /// 全天时段 00:00–23:59。
    pub fn full_day() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// 解析 `HH:MM` / `HH:MM:SS` 形式的起止时间。
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        Ok(Self {
            start: parse_local_time(start)?,
            end: parse_local_time(end)?,
        })
    }

    /// `start > end`（跨午夜）的时段不匹配任何时刻。
    pub fn contains(&self, minute: NaiveTime) -> bool {
        self.start <= minute && minute <= self.end
    }
}

fn parse_local_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("invalid local time: {value:?}"))
}

/// 解析 IANA 时区名。
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| format!("unknown timezone: {name:?}"))
}

/// 单个门店的营业日历。
#[derive(Debug, Clone)]
pub struct StoreCalendar {
    pub store_id: String,
    pub timezone: Tz,
    /// 下标 0=周一 … 6=周日。
    days: [Vec<LocalTimeRange>; 7],
}

impl StoreCalendar {
    /// 全天营业日历。
    pub fn always_open(store_id: impl Into<String>, timezone: Tz) -> Self {
        Self {
            store_id: store_id.into(),
            timezone,
            days: std::array::from_fn(|_| vec![LocalTimeRange::full_day()]),
        }
    }

    /// 由营业时间规则构建；规则为空时退化为全天营业。
    pub fn from_rules(
        store_id: impl Into<String>,
        timezone: Tz,
        rules: &[BusinessHoursRule],
    ) -> Result<Self, EngineError> {
        let store_id = store_id.into();
        if rules.is_empty() {
            return Ok(Self::always_open(store_id, timezone));
        }
        let mut days: [Vec<LocalTimeRange>; 7] = Default::default();
        for rule in rules {
            let day = usize::from(rule.day_of_week);
            if day > 6 {
                return Err(EngineError::aggregation(
                    &store_id,
                    format!("day_of_week out of range: {day}"),
                ));
            }
            let range = LocalTimeRange::parse(&rule.start_time_local, &rule.end_time_local)
                .map_err(|message| EngineError::aggregation(&store_id, message))?;
            days[day].push(range);
        }
        Ok(Self {
            store_id,
            timezone,
            days,
        })
    }

    /// 某星期的营业时段。
    pub fn ranges(&self, day_of_week: usize) -> &[LocalTimeRange] {
        self.days.get(day_of_week).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 判断 UTC 时刻是否落在本地营业时间内。
    pub fn is_open_at(&self, timestamp: DateTime<Utc>) -> bool {
        let local = timestamp.with_timezone(&self.timezone);
        let day = local.weekday().num_days_from_monday() as usize;
        let Some(minute) = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0) else {
            return false;
        };
        self.ranges(day).iter().any(|range| range.contains(minute))
    }
}

/// 营业日历解析器。
///
/// 不跨门店缓存：每次按门店读取规则，默认日历也按门店生成。
pub struct CalendarResolver {
    catalog: Arc<dyn StoreCatalog>,
    default_timezone: Tz,
}

impl CalendarResolver {
    pub fn new(catalog: Arc<dyn StoreCatalog>, default_timezone: Tz) -> Self {
        Self {
            catalog,
            default_timezone,
        }
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_timezone
    }

    pub async fn resolve(&self, store_id: &str) -> Result<StoreCalendar, EngineError> {
        let store = self.catalog.find_store(store_id).await?;
        let timezone = match store
            .and_then(|store| store.timezone)
            .filter(|name| !name.trim().is_empty())
        {
            Some(name) => {
                parse_timezone(&name).map_err(|message| EngineError::aggregation(store_id, message))?
            }
            None => self.default_timezone,
        };
        let rules = self.catalog.list_business_hours(store_id).await?;
        StoreCalendar::from_rules(store_id, timezone, &rules)
    }
}
