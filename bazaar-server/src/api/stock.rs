//! Stock adjustment endpoint

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::AppError;

use crate::auth::vendor_auth::VendorIdentity;
use crate::catalog::stock::StockDirection;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

#[derive(serde::Deserialize)]
pub struct AdjustStockRequest {
    pub direction: StockDirection,
    pub qty: i32,
    /// Target a specific variant; absent targets the product's own counter
    pub variant_id: Option<i64>,
}

#[derive(serde::Serialize)]
pub struct StockLevel {
    pub stock: i32,
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
    Json(req): Json<AdjustStockRequest>,
) -> ApiResult<StockLevel> {
    if req.qty <= 0 {
        return Err(AppError::validation("qty must be positive").into());
    }
    let stock = db::stock::adjust_stock(
        &state.pool,
        identity.vendor_id,
        product_id,
        req.variant_id,
        req.direction,
        req.qty,
    )
    .await?;
    Ok(Json(StockLevel { stock }))
}
