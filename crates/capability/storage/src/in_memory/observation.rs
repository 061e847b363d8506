//! 状态观测内存实现
//!
//! 观测按写入顺序保存，查询时再按时间排序。

use crate::error::StorageError;
use crate::models::ObservationBounds;
use crate::traits::ObservationStore;
use crate::validation::{ensure_id, ensure_range};
use chrono::{DateTime, Utc};
use domain::StatusObservation;
use std::sync::RwLock;

/// 状态观测内存存储
pub struct InMemoryObservationStore {
    values: RwLock<Vec<StatusObservation>>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(Vec::new()),
        }
    }

    /// 追加单条观测
    pub fn insert_observation(&self, value: StatusObservation) -> Result<(), StorageError> {
        ensure_id(&value.store_id, "store_id")?;
        let mut values = self
            .values
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        values.push(value);
        Ok(())
    }

    /// 批量追加观测
    pub fn insert_observations(
        &self,
        items: impl IntoIterator<Item = StatusObservation>,
    ) -> Result<usize, StorageError> {
        let items: Vec<StatusObservation> = items.into_iter().collect();
        for item in &items {
            ensure_id(&item.store_id, "store_id")?;
        }
        let mut values = self
            .values
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let count = items.len();
        values.extend(items);
        Ok(count)
    }

    /// 当前观测条数（用于测试）
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ObservationStore for InMemoryObservationStore {
    async fn query_observations(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusObservation>, StorageError> {
        ensure_range(start, end)?;
        let values = self
            .values
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut selected: Vec<StatusObservation> = values
            .iter()
            .filter(|item| {
                item.store_id == store_id
                    && item.timestamp_utc >= start
                    && item.timestamp_utc <= end
            })
            .cloned()
            .collect();
        selected.sort_by_key(|item| item.timestamp_utc);
        Ok(selected)
    }

    async fn observation_bounds(&self) -> Result<Option<ObservationBounds>, StorageError> {
        let values = self
            .values
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut bounds: Option<ObservationBounds> = None;
        for item in values.iter() {
            let ts = item.timestamp_utc;
            bounds = Some(match bounds {
                None => ObservationBounds {
                    earliest: ts,
                    latest: ts,
                },
                Some(current) => ObservationBounds {
                    earliest: current.earliest.min(ts),
                    latest: current.latest.max(ts),
                },
            });
        }
        Ok(bounds)
    }
}
