//! 进程内产品存储
//!
//! 不依赖数据库，用于测试以及 `backend = "memory"` 的本地运行。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::model::{Product, ProductInput};
use super::store::{ProductStore, StoreError};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i32, Product>,
    next_id: i32,
}

#[derive(Debug)]
pub struct MemoryProductStore {
    table: Mutex<Table>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("内存表锁已中毒".to_string()))
    }
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let mut table = self.lock()?;
        let id = table.next_id;
        table.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Unavailable("产品 ID 已耗尽".to_string()))?;

        let now = Utc::now();
        let product = Product {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, StoreError> {
        let mut table = self.lock()?;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        // 时钟粒度不足时仍保证 updated_at 严格递增
        let now = Utc::now();
        row.updated_at = if now > row.updated_at {
            now
        } else {
            row.updated_at + Duration::microseconds(1)
        };
        row.name = input.name.clone();
        row.description = input.description.clone();
        row.price = input.price;

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.rows.remove(&id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
