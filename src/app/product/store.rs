//! 产品存储抽象

use async_trait::async_trait;

use super::model::{Product, ProductInput};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 产品表的单行操作
///
/// 查找不到对应行时返回 `Ok(None)`，只有存储本身出错时才返回 `Err`。
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 插入一行并返回包含新 ID 的完整记录
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError>;

    /// 按 ID 升序返回全部记录
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Product>, StoreError>;

    /// 整行替换 name、description、price 并刷新 updated_at
    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, StoreError>;

    /// 删除并返回被删除的行
    async fn delete(&self, id: i32) -> Result<Option<Product>, StoreError>;

    /// 存储连通性检查
    async fn ping(&self) -> Result<(), StoreError>;
}
