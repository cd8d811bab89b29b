//! 数据库基础设施

use std::sync::Arc;
use tracing::info;

use crate::app::product::{MemoryProductStore, ProductStore};
use crate::config::{DatabaseConfig, StoreBackend};

#[cfg(feature = "database")]
use crate::app::product::PgProductStore;
#[cfg(feature = "database")]
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
#[cfg(feature = "database")]
use std::time::Duration;

#[cfg(feature = "database")]
pub struct DatabaseManager {
    pool: PgPool,
}

#[cfg(feature = "database")]
impl DatabaseManager {
    /// 按配置建立连接池
    ///
    /// 未配置 `url` 时使用 libpq 环境变量（`PGHOST`、`PGPORT`、`PGUSER`、`PGPASSWORD`、`PGDATABASE`）。
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = match &config.url {
            Some(url) => url.parse::<PgConnectOptions>()?,
            None => PgConnectOptions::new(),
        };

        info!(
            "连接数据库 (连接池: {}-{})",
            config.min_connections, config.max_connections
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

/// 按配置打开产品存储
pub async fn open_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn ProductStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("使用内存存储，数据不会持久化");
            Ok(Arc::new(MemoryProductStore::new()))
        }
        #[cfg(feature = "database")]
        StoreBackend::Postgres => {
            let manager = DatabaseManager::new(config).await?;
            let store = PgProductStore::new(manager.get_pool().clone());
            if config.ensure_schema {
                store.ensure_schema().await?;
            }
            info!("数据库连接成功");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "database"))]
        StoreBackend::Postgres => {
            anyhow::bail!("未启用 database 特性，无法使用 postgres 存储后端")
        }
    }
}
