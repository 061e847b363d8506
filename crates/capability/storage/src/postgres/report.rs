//! Postgres 报表存储实现
//!
//! 设计要点：
//! - 终态更新带 `status = 'running'` 条件，终态记录不会被覆盖
//! - 单批结果在同一事务内先删后插

use crate::error::StorageError;
use crate::models::ReportUpdate;
use crate::traits::ReportStore;
use crate::validation::ensure_id;
use chrono::{DateTime, Utc};
use domain::{ReportRun, ReportStatus, StoreMetricRow, check_terminal};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgReportStore {
    pub pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn report_from_row(row: &PgRow) -> Result<ReportRun, StorageError> {
    let raw_status: String = row.try_get("status")?;
    let status = ReportStatus::parse(&raw_status)
        .ok_or_else(|| StorageError::new(format!("invalid report status: {raw_status}")))?;
    Ok(ReportRun {
        report_id: row.try_get("report_id")?,
        status,
        artifact_location: row.try_get("file_path")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

#[async_trait::async_trait]
impl ReportStore for PgReportStore {
    async fn create_report(
        &self,
        report_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ReportRun, StorageError> {
        ensure_id(report_id, "report_id")?;
        let run = ReportRun::new(report_id, created_at);
        sqlx::query(
            "insert into reports (report_id, status, file_path, created_at, completed_at) \
             values ($1, $2, null, $3, null)",
        )
        .bind(&run.report_id)
        .bind(run.status.as_str())
        .bind(run.created_at)
        .execute(&self.pool)
        .await?;
        Ok(run)
    }

    async fn find_report(&self, report_id: &str) -> Result<Option<ReportRun>, StorageError> {
        let row = sqlx::query(
            "select report_id, status, file_path, created_at, completed_at \
             from reports where report_id = $1",
        )
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(report_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_report(
        &self,
        report_id: &str,
        update: ReportUpdate,
    ) -> Result<Option<ReportRun>, StorageError> {
        check_terminal(update.status, update.artifact_location.as_deref())?;
        let artifact_location = match update.status {
            ReportStatus::Completed => update.artifact_location,
            _ => None,
        };
        let completed_at = update.completed_at.unwrap_or_else(Utc::now);
        let row = sqlx::query(
            "update reports set \
             status = $1, \
             file_path = $2, \
             completed_at = $3 \
             where report_id = $4 and status = 'running' \
             returning report_id, status, file_path, created_at, completed_at",
        )
        .bind(update.status.as_str())
        .bind(artifact_location)
        .bind(completed_at)
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return Ok(Some(report_from_row(&row)?));
        }
        match self.find_report(report_id).await? {
            Some(existing) => Err(StorageError::new(format!(
                "invalid report transition: report already {}",
                existing.status.as_str()
            ))),
            None => Ok(None),
        }
    }

    async fn save_batch_rows(
        &self,
        report_id: &str,
        batch_index: usize,
        rows: &[StoreMetricRow],
    ) -> Result<usize, StorageError> {
        ensure_id(report_id, "report_id")?;
        let batch_index = i32::try_from(batch_index)
            .map_err(|_| StorageError::new("batch_index out of range"))?;
        let mut tx = self.pool.begin().await?;
        sqlx::query("delete from report_rows where report_id = $1 and batch_index = $2")
            .bind(report_id)
            .bind(batch_index)
            .execute(&mut *tx)
            .await?;
        for (position, row) in rows.iter().enumerate() {
            sqlx::query(
                "insert into report_rows (report_id, batch_index, position, store_id, \
                 uptime_last_hour, uptime_last_day, uptime_last_week, \
                 downtime_last_hour, downtime_last_day, downtime_last_week) \
                 values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(report_id)
            .bind(batch_index)
            .bind(position as i32)
            .bind(&row.store_id)
            .bind(row.uptime_last_hour)
            .bind(row.uptime_last_day)
            .bind(row.uptime_last_week)
            .bind(row.downtime_last_hour)
            .bind(row.downtime_last_day)
            .bind(row.downtime_last_week)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len())
    }

    async fn list_batch_rows(&self, report_id: &str) -> Result<Vec<StoreMetricRow>, StorageError> {
        let rows = sqlx::query(
            "select store_id, uptime_last_hour, uptime_last_day, uptime_last_week, \
             downtime_last_hour, downtime_last_day, downtime_last_week \
             from report_rows where report_id = $1 \
             order by batch_index, position",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(StoreMetricRow {
                store_id: row.try_get("store_id")?,
                uptime_last_hour: row.try_get("uptime_last_hour")?,
                uptime_last_day: row.try_get("uptime_last_day")?,
                uptime_last_week: row.try_get("uptime_last_week")?,
                downtime_last_hour: row.try_get("downtime_last_hour")?,
                downtime_last_day: row.try_get("downtime_last_day")?,
                downtime_last_week: row.try_get("downtime_last_week")?,
            });
        }
        Ok(items)
    }
}
