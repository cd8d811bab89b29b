//! 基础设施层：数据库连接与日志

pub mod database;
pub mod logger;

pub use database::open_store;
pub use logger::Logger;
