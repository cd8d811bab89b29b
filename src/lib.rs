//! # 产品 CRUD 服务
//!
//! 基于 Axum 的单资源 REST 服务，把 `/products` 的五个路由映射为对 `products` 表的参数化 SQL：
//! - `app`：路由、处理器、业务服务与存储抽象
//! - `core`：统一错误响应与请求日志中间件
//! - `infrastructure`：数据库连接池与日志初始化
//! - `config`：默认值、TOML 文件与环境变量的分层配置

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::create_routes;
pub use app::product::{AppState, ProductService};
pub use config::{load_config, Config};
