//! Postgres 门店目录实现

use crate::error::StorageError;
use crate::traits::StoreCatalog;
use crate::validation::ensure_weekday;
use domain::{BusinessHoursRule, StoreRecord};
use sqlx::{PgPool, Row};

pub struct PgStoreCatalog {
    pub pool: PgPool,
}

impl PgStoreCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl StoreCatalog for PgStoreCatalog {
    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError> {
        let rows = sqlx::query("select store_id, timezone from stores order by store_id")
            .fetch_all(&self.pool)
            .await?;
        let mut stores = Vec::with_capacity(rows.len());
        for row in rows {
            stores.push(StoreRecord {
                store_id: row.try_get("store_id")?,
                timezone: row.try_get("timezone")?,
            });
        }
        Ok(stores)
    }

    async fn find_store(&self, store_id: &str) -> Result<Option<StoreRecord>, StorageError> {
        let row = sqlx::query("select store_id, timezone from stores where store_id = $1")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(StoreRecord {
            store_id: row.try_get("store_id")?,
            timezone: row.try_get("timezone")?,
        }))
    }

    async fn list_business_hours(
        &self,
        store_id: &str,
    ) -> Result<Vec<BusinessHoursRule>, StorageError> {
        let rows = sqlx::query(
            "select store_id, day_of_week, start_time_local, end_time_local \
             from business_hours where store_id = $1 \
             order by day_of_week, start_time_local",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let day_of_week: i32 = row.try_get("day_of_week")?;
            rules.push(BusinessHoursRule {
                store_id: row.try_get("store_id")?,
                day_of_week: ensure_weekday(day_of_week)?,
                start_time_local: row.try_get("start_time_local")?,
                end_time_local: row.try_get("end_time_local")?,
            });
        }
        Ok(rules)
    }
}
