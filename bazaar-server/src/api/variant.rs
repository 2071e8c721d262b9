//! Vendor variant endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::variant::{ProductVariant, VariantInput};

use crate::auth::vendor_auth::VendorIdentity;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, require_discount_range};

pub(crate) fn validate_variant_input(input: &VariantInput) -> Result<(), AppError> {
    if input.sku.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "sku is required",
        ));
    }
    if input.price < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "price must not be negative",
        ));
    }
    require_discount_range(input.discount_percent)?;
    if let Some(stock) = input.stock
        && stock < 0
    {
        return Err(AppError::validation("stock must not be negative"));
    }
    Ok(())
}

/// Create a variant (`id` absent) or update an existing one (`id` present).
pub async fn upsert_variant(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
    Json(input): Json<VariantInput>,
) -> ApiResult<ProductVariant> {
    validate_variant_input(&input)?;
    let variant =
        db::variant::upsert_variant(&state.pool, identity.vendor_id, product_id, &input).await?;
    Ok(Json(variant))
}
