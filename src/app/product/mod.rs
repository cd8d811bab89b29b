//! 产品资源：模型、存储、服务与处理器

pub mod handler;
pub mod memory_store;
pub mod model;
#[cfg(feature = "database")]
pub mod pg_store;
pub mod service;
pub mod store;

pub use handler::AppState;
pub use memory_store::MemoryProductStore;
pub use model::{Product, ProductInput, ProductPayload};
#[cfg(feature = "database")]
pub use pg_store::PgProductStore;
pub use service::ProductService;
pub use store::{ProductStore, StoreError};
