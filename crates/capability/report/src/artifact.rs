//! 报表产物（CSV）。
//!
//! 列顺序固定，带表头；数值保留两位小数。
//! 先写临时文件再改名，最终路径上不会出现半成品。

use crate::error::ReportError;
use async_trait::async_trait;
use domain::StoreMetricRow;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "store_id,uptime_last_hour,uptime_last_day,uptime_last_week,downtime_last_hour,downtime_last_day,downtime_last_week";

/// 产物写入接口。
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// 写入产物，返回产物位置。
    async fn write_artifact(
        &self,
        report_id: &str,
        rows: &[StoreMetricRow],
    ) -> Result<String, ReportError>;

    /// 按位置读回产物内容。
    async fn read_artifact(&self, location: &str) -> Result<Vec<u8>, ReportError>;

    /// 删除产物；产物不存在视为成功。
    async fn remove_artifact(&self, location: &str) -> Result<(), ReportError>;
}

/// 渲染 CSV 文本（含表头，每行以 `\n` 结尾）。
pub fn render_csv(rows: &[StoreMetricRow]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows.len() * 64);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&escape_field(&row.store_id));
        for value in [
            row.uptime_last_hour,
            row.uptime_last_day,
            row.uptime_last_week,
            row.downtime_last_hour,
            row.downtime_last_day,
            row.downtime_last_week,
        ] {
            out.push(',');
            out.push_str(&format!("{value:.2}"));
        }
        out.push('\n');
    }
    out
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// 本地目录 CSV 产物：`<dir>/report_<id>.csv`。
#[derive(Debug, Clone)]
pub struct CsvArtifactSink {
    dir: PathBuf,
}

impl CsvArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, report_id: &str) -> PathBuf {
        self.dir.join(format!("report_{report_id}.csv"))
    }
}

#[async_trait]
impl ArtifactSink for CsvArtifactSink {
    async fn write_artifact(
        &self,
        report_id: &str,
        rows: &[StoreMetricRow],
    ) -> Result<String, ReportError> {
        if report_id.is_empty() || report_id.contains(['/', '\\']) {
            return Err(ReportError::Artifact(format!(
                "invalid report id: {report_id:?}"
            )));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.artifact_path(report_id);
        let tmp = self.dir.join(format!(".report_{report_id}.csv.tmp"));
        if let Err(err) = tokio::fs::write(&tmp, render_csv(rows)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        tokio::fs::rename(&tmp, &path).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read_artifact(&self, location: &str) -> Result<Vec<u8>, ReportError> {
        Ok(tokio::fs::read(location).await?)
    }

    async fn remove_artifact(&self, location: &str) -> Result<(), ReportError> {
        match tokio::fs::remove_file(location).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
