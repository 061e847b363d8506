//! 应用运行配置加载。

use domain::DEFAULT_TIMEZONE;
use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub reports_dir: String,
    pub default_timezone: String,
    pub batch_size: usize,
    /// 未设置时处理全部批次。
    pub batch_index: Option<usize>,
    pub worker_concurrency: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("UPTIME_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("UPTIME_DATABASE_URL".to_string()))?;
        let http_addr =
            env::var("UPTIME_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let db_max_connections = read_u32_with_default("UPTIME_DB_MAX_CONNECTIONS", 8)?;
        let reports_dir = read_optional("UPTIME_REPORTS_DIR").unwrap_or_else(|| "reports".to_string());
        let default_timezone = read_optional("UPTIME_DEFAULT_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let batch_size = read_positive_with_default("UPTIME_BATCH_SIZE", 100)?;
        let batch_index = read_optional_usize("UPTIME_BATCH_INDEX")?;
        let worker_concurrency = read_positive_with_default("UPTIME_WORKER_CONCURRENCY", 8)?;

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            reports_dir,
            default_timezone,
            batch_size,
            batch_index,
            worker_concurrency,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 读取正整数（0 视为非法）。
fn read_positive_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}
