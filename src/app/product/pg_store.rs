//! PostgreSQL 产品存储
//!
//! 每个操作都是一条参数化 SQL，依赖数据库对单行语句的原子性，不开启事务。

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use super::model::{Product, ProductInput};
use super::store::{ProductStore, StoreError};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price NUMERIC NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 表不存在时创建 `products` 表
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        info!("检查 products 表...");
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, description, price) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn get(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET name = $1, description = $2, price = $3, updated_at = CURRENT_TIMESTAMP WHERE id = $4 RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>("DELETE FROM products WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
