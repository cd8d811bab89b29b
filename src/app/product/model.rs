//! 产品数据模型

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use validator::Validate;

/// `products` 表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建与更新请求体
///
/// 字段都声明为 `Option`，缺失与 `null` 统一由校验报告。
/// `price` 既可以是 JSON 数字，也可以是数字字符串。
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(required)]
    pub price: Option<Value>,
}

/// 通过校验后写入存储的字段
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// name 或 price 缺失
    MissingFields,
    /// price 无法解析为数字
    InvalidPrice,
    /// price 是数字，但超出十进制类型的范围
    PriceOutOfRange,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PriceError {
    NotANumber,
    OutOfRange,
}

impl From<PriceError> for PayloadError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::NotANumber => PayloadError::InvalidPrice,
            PriceError::OutOfRange => PayloadError::PriceOutOfRange,
        }
    }
}

impl ProductPayload {
    pub fn into_input(self) -> Result<ProductInput, PayloadError> {
        if self.validate().is_err() {
            return Err(PayloadError::MissingFields);
        }
        let (Some(name), Some(price)) = (self.name, self.price) else {
            return Err(PayloadError::MissingFields);
        };
        let price = parse_price(&price)?;

        Ok(ProductInput {
            name,
            description: self.description,
            price,
        })
    }
}

/// 把请求中的价格解析为十进制数
///
/// 先按十进制精确解析；超出 28 位小数精度的值退回到 f64 再取最近的十进制数，
/// 过小的值因此舍入为 0，只有超过 `Decimal::MAX` 的值才算越界。
pub fn parse_price(value: &Value) -> Result<Decimal, PriceError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Decimal::from(i));
            }
            if let Some(exact) = parse_decimal(&n.to_string()) {
                return Ok(exact);
            }
            let float = n.as_f64().ok_or(PriceError::NotANumber)?;
            decimal_from_f64(float)
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(PriceError::NotANumber);
            }
            if let Some(exact) = parse_decimal(s) {
                return Ok(exact);
            }
            let float: f64 = s.parse().map_err(|_| PriceError::NotANumber)?;
            decimal_from_f64(float)
        }
        _ => Err(PriceError::NotANumber),
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn decimal_from_f64(float: f64) -> Result<Decimal, PriceError> {
    // "inf"、"NaN" 能被 f64 解析，但不是价格
    if !float.is_finite() {
        return Err(PriceError::NotANumber);
    }
    Decimal::from_f64(float).ok_or(PriceError::OutOfRange)
}
