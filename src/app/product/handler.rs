//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::debug;

use super::{
    model::{Product, ProductPayload},
    service::ProductService,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub storage: &'static str,
}

/// 无法解析的请求体视为没有任何字段，交给字段校验报告
fn payload_or_empty(payload: Result<Json<ProductPayload>, JsonRejection>) -> ProductPayload {
    match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("请求体无法解析: {}", rejection.body_text());
            ProductPayload::default()
        }
    }
}

pub async fn greeting() -> &'static str {
    "Hello from the products CRUD service!"
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    if state.product_service.storage_available().await {
        (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                storage: "ok",
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "degraded",
                storage: "unavailable",
            }),
        )
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), CoreError> {
    let product = state
        .product_service
        .create_product(payload_or_empty(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let product = state.product_service.get_product(&id).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<Json<Product>, CoreError> {
    let product = state
        .product_service
        .update_product(&id, payload_or_empty(payload))
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
    state.product_service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
