//! Product variant model

use serde::{Deserialize, Serialize};

/// A purchasable configuration of a product (e.g. a size/color) with its
/// own SKU, price, and stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    /// Attribute map (e.g. {"size": "M", "color": "red"})
    pub attributes: serde_json::Value,
    pub price: f64,
    pub mrp: Option<f64>,
    pub discount_percent: f64,
    /// Derived from price and discount_percent
    pub final_price: f64,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create-or-update variant payload
///
/// `id` present → update the existing variant; absent → create a new one
/// scoped to the target product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantInput {
    pub id: Option<i64>,
    pub sku: String,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
    pub price: f64,
    pub mrp: Option<f64>,
    pub discount_percent: Option<f64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}
