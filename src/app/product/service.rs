//! 产品业务服务

use std::sync::Arc;
use tracing::{info, warn};

use super::model::{PayloadError, Product, ProductPayload};
use super::store::{ProductStore, StoreError};
use crate::core::error::CoreError;

pub const CREATE_FIELDS_REQUIRED: &str = "Name and price are required";
pub const UPDATE_FIELDS_REQUIRED: &str = "Name and price are required for update";
pub const INVALID_PRICE: &str = "Price must be a number";
pub const PRICE_OUT_OF_RANGE: &str = "Price is out of range";
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn create_product(&self, payload: ProductPayload) -> Result<Product, CoreError> {
        let input = payload
            .into_input()
            .map_err(|e| payload_error(e, CREATE_FIELDS_REQUIRED))?;

        let product = self
            .store
            .insert(&input)
            .await
            .map_err(|e| storage_failure("创建产品", None, e))?;

        info!("创建产品: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        self.store
            .list()
            .await
            .map_err(|e| storage_failure("获取产品列表", None, e))
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, CoreError> {
        let id = parse_id(id)?;
        self.store
            .get(id)
            .await
            .map_err(|e| storage_failure("获取产品", Some(id), e))?
            .ok_or_else(not_found)
    }

    /// 请求体校验先于 ID 查找：无效请求体总是返回 400
    pub async fn update_product(
        &self,
        id: &str,
        payload: ProductPayload,
    ) -> Result<Product, CoreError> {
        let input = payload
            .into_input()
            .map_err(|e| payload_error(e, UPDATE_FIELDS_REQUIRED))?;
        let id = parse_id(id)?;

        let product = self
            .store
            .update(id, &input)
            .await
            .map_err(|e| storage_failure("更新产品", Some(id), e))?
            .ok_or_else(not_found)?;

        info!("更新产品: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), CoreError> {
        let id = parse_id(id)?;
        self.store
            .delete(id)
            .await
            .map_err(|e| storage_failure("删除产品", Some(id), e))?
            .ok_or_else(not_found)?;

        info!("删除产品: {}", id);
        Ok(())
    }

    /// 存储是否可用
    pub async fn storage_available(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("存储健康检查失败: {}", e);
                false
            }
        }
    }
}

fn payload_error(err: PayloadError, missing_message: &str) -> CoreError {
    match err {
        PayloadError::MissingFields => CoreError::BadRequest(missing_message.to_string()),
        PayloadError::InvalidPrice => CoreError::BadRequest(INVALID_PRICE.to_string()),
        PayloadError::PriceOutOfRange => CoreError::BadRequest(PRICE_OUT_OF_RANGE.to_string()),
    }
}

/// 非整数的 ID 不可能匹配任何行，按未找到处理
fn parse_id(raw: &str) -> Result<i32, CoreError> {
    raw.trim().parse().map_err(|_| not_found())
}

fn not_found() -> CoreError {
    CoreError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

fn storage_failure(operation: &str, id: Option<i32>, err: StoreError) -> CoreError {
    match id {
        Some(id) => CoreError::InternalServerError(format!("{} {} 失败: {}", operation, id, err)),
        None => CoreError::InternalServerError(format!("{}失败: {}", operation, err)),
    }
}
