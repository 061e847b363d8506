//! 门店目录内存实现
//!
//! 使用 RwLock 提供线程安全的内存存储，支持测试数据灌入。

use crate::error::StorageError;
use crate::traits::StoreCatalog;
use crate::validation::ensure_id;
use domain::{BusinessHoursRule, StoreRecord};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 门店目录内存存储
pub struct InMemoryStoreCatalog {
    stores: RwLock<BTreeMap<String, StoreRecord>>,
    hours: RwLock<Vec<BusinessHoursRule>>,
}

impl InMemoryStoreCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(BTreeMap::new()),
            hours: RwLock::new(Vec::new()),
        }
    }

    /// 写入（或覆盖）门店
    pub fn insert_store(&self, record: StoreRecord) -> Result<(), StorageError> {
        ensure_id(&record.store_id, "store_id")?;
        let mut stores = self
            .stores
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        stores.insert(record.store_id.clone(), record);
        Ok(())
    }

    /// 追加营业时间规则
    pub fn insert_business_hours(&self, rule: BusinessHoursRule) -> Result<(), StorageError> {
        ensure_id(&rule.store_id, "store_id")?;
        if rule.day_of_week > 6 {
            return Err(StorageError::new(format!(
                "day_of_week out of range: {}",
                rule.day_of_week
            )));
        }
        let mut hours = self
            .hours
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        hours.push(rule);
        Ok(())
    }
}

impl Default for InMemoryStoreCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StoreCatalog for InMemoryStoreCatalog {
    async fn list_stores(&self) -> Result<Vec<StoreRecord>, StorageError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(stores.values().cloned().collect())
    }

    async fn find_store(&self, store_id: &str) -> Result<Option<StoreRecord>, StorageError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(stores.get(store_id).cloned())
    }

    async fn list_business_hours(
        &self,
        store_id: &str,
    ) -> Result<Vec<BusinessHoursRule>, StorageError> {
        let hours = self
            .hours
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(hours
            .iter()
            .filter(|rule| rule.store_id == store_id)
            .cloned()
            .collect())
    }
}
