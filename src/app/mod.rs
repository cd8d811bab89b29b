//! 应用层：路由与资源处理器

pub mod product;

use axum::{middleware, routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::core::middleware::request_logging_middleware;
use product::handler::{
    create_product, delete_product, get_product, greeting, health_check, list_products,
    update_product, AppState,
};

/// 创建路由
pub fn create_routes(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/health", get(health_check))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // 位于 CORS 与超时之外，预检响应和 408 同样带请求 ID
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
