//! 报表运行记录与状态机。
//!
//! 状态单调：Running → Completed | Failed，终态不可再迁移。

use chrono::{DateTime, Utc};

/// 报表状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Running,
    Completed,
    Failed,
}

impl ReportStatus {
    /// 持久化使用的小写字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Running => "running",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Some(ReportStatus::Running),
            "completed" => Some(ReportStatus::Completed),
            "failed" => Some(ReportStatus::Failed),
            _ => None,
        }
    }

    /// 对外展示用的首字母大写形式。
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Running => "Running",
            ReportStatus::Completed => "Completed",
            ReportStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReportStatus::Running)
    }
}

/// 非法状态迁移。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("report already {0}")]
    AlreadyTerminal(&'static str),
    #[error("target status must be terminal")]
    NotTerminal,
    #[error("completed report requires artifact location")]
    MissingArtifact,
}

/// 报表运行记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRun {
    pub report_id: String,
    pub status: ReportStatus,
    /// 仅 Completed 时有值。
    pub artifact_location: Option<String>,
    pub created_at: DateTime<Utc>,
    /// 进入终态时写入。
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReportRun {
    /// 新建运行中的报表。
    pub fn new(report_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            report_id: report_id.into(),
            status: ReportStatus::Running,
            artifact_location: None,
            created_at,
            completed_at: None,
        }
    }

    /// 执行一次终态迁移。
    ///
    /// Failed 会丢弃传入的产物位置。
    pub fn transition(
        &mut self,
        status: ReportStatus,
        artifact_location: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyTerminal(self.status.as_str()));
        }
        check_terminal(status, artifact_location.as_deref())?;
        self.artifact_location = match status {
            ReportStatus::Completed => artifact_location,
            _ => None,
        };
        self.status = status;
        self.completed_at = Some(completed_at);
        Ok(())
    }
}

/// 校验目标状态可作为终态写入（不检查当前状态）。
pub fn check_terminal(
    status: ReportStatus,
    artifact_location: Option<&str>,
) -> Result<(), TransitionError> {
    match status {
        ReportStatus::Running => Err(TransitionError::NotTerminal),
        ReportStatus::Completed if artifact_location.is_none() => {
            Err(TransitionError::MissingArtifact)
        }
        _ => Ok(()),
    }
}
