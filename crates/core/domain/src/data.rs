use chrono::{DateTime, Utc};

/// 门店在线状态（轮询采样值）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Active => "active",
            StoreStatus::Inactive => "inactive",
        }
    }

    /// 解析存储中的状态字符串（忽略大小写与首尾空格）。
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(StoreStatus::Active),
            "inactive" => Some(StoreStatus::Inactive),
            _ => None,
        }
    }
}

/// 门店记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub store_id: String,
    /// IANA 时区名；缺省时由日历解析器回落到默认时区。
    pub timezone: Option<String>,
}

/// 营业时间规则（本地时间，按星期）。
///
/// `day_of_week`：0=周一 … 6=周日；时间为 `HH:MM` 或 `HH:MM:SS`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessHoursRule {
    pub store_id: String,
    pub day_of_week: u8,
    pub start_time_local: String,
    pub end_time_local: String,
}

/// 单次状态观测。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusObservation {
    pub store_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub status: StoreStatus,
}
