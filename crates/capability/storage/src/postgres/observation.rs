//! Postgres 状态观测实现

use crate::error::StorageError;
use crate::models::ObservationBounds;
use crate::traits::ObservationStore;
use crate::validation::ensure_range;
use chrono::{DateTime, Utc};
use domain::{StatusObservation, StoreStatus};
use sqlx::{PgPool, Row};

pub struct PgObservationStore {
    pub pool: PgPool,
}

impl PgObservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ObservationStore for PgObservationStore {
    async fn query_observations(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusObservation>, StorageError> {
        ensure_range(start, end)?;
        let rows = sqlx::query(
            "select store_id, timestamp_utc, status \
             from store_status \
             where store_id = $1 \
             and timestamp_utc between $2 and $3 \
             order by timestamp_utc asc",
        )
        .bind(store_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_status: String = row.try_get("status")?;
            let status = StoreStatus::parse(&raw_status).ok_or_else(|| {
                StorageError::new(format!("invalid store status: {raw_status}"))
            })?;
            items.push(StatusObservation {
                store_id: row.try_get("store_id")?,
                timestamp_utc: row.try_get("timestamp_utc")?,
                status,
            });
        }
        Ok(items)
    }

    async fn observation_bounds(&self) -> Result<Option<ObservationBounds>, StorageError> {
        let row = sqlx::query(
            "select min(timestamp_utc) as earliest, max(timestamp_utc) as latest \
             from store_status",
        )
        .fetch_one(&self.pool)
        .await?;
        let earliest: Option<DateTime<Utc>> = row.try_get("earliest")?;
        let latest: Option<DateTime<Utc>> = row.try_get("latest")?;
        Ok(match (earliest, latest) {
            (Some(earliest), Some(latest)) => Some(ObservationBounds { earliest, latest }),
            _ => None,
        })
    }
}
