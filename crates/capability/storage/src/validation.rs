//! 验证辅助函数
//!
//! - ensure_id：标识非空
//! - ensure_range：时间范围合法（start <= end）
//! - ensure_weekday：星期取值 0..=6

use crate::error::StorageError;
use chrono::{DateTime, Utc};

/// 验证标识非空
pub fn ensure_id(value: &str, field: &str) -> Result<(), StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::new(format!("{field} required")));
    }
    Ok(())
}

/// 验证查询范围
pub fn ensure_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), StorageError> {
    if start > end {
        return Err(StorageError::new("range start must be <= end"));
    }
    Ok(())
}

/// 验证星期（0=周一 … 6=周日）
pub fn ensure_weekday(day_of_week: i32) -> Result<u8, StorageError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(StorageError::new(format!(
            "day_of_week out of range: {day_of_week}"
        )));
    }
    Ok(day_of_week as u8)
}
