//! Vendor product endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::error::{AppError, ApiResponse, ErrorCode};
use shared::models::product::{
    PricingUpdate, ProductCreate, ProductPage, ProductStatus, ProductUpdate, ProductWithVariants,
};

use crate::auth::vendor_auth::VendorIdentity;
use crate::db;
use crate::db::product::PricingTarget;
use crate::state::AppState;

use super::{ApiResult, require_discount_range};

fn validate_status(status: Option<&str>) -> Result<(), AppError> {
    if let Some(s) = status
        && ProductStatus::parse(s).is_none()
    {
        return Err(AppError::validation(
            "status must be draft, published, or inactive",
        ));
    }
    Ok(())
}

fn validate_product_create(data: &ProductCreate) -> Result<(), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "name is required",
        ));
    }
    if data.base_price <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "base_price must be positive",
        ));
    }
    require_discount_range(data.discount_percent)?;
    validate_status(data.status.as_deref())?;
    if let Some(stock) = data.stock
        && stock < 0
    {
        return Err(AppError::validation("stock must not be negative"));
    }
    if data.variants.is_empty() {
        return Err(AppError::new(ErrorCode::ProductNoVariants));
    }
    for input in &data.variants {
        super::variant::validate_variant_input(input)?;
    }
    Ok(())
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Json(data): Json<ProductCreate>,
) -> ApiResult<ProductWithVariants> {
    validate_product_create(&data)?;
    let created =
        db::product::create_product_with_variants(&state.pool, identity.vendor_id, &data).await?;
    Ok(Json(created))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
    Json(data): Json<ProductUpdate>,
) -> ApiResult<shared::models::product::Product> {
    if let Some(name) = &data.name
        && name.trim().is_empty()
    {
        return Err(AppError::with_message(ErrorCode::RequiredField, "name must not be empty").into());
    }
    if let Some(bp) = data.base_price
        && bp <= 0.0
    {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "base_price must be positive",
        )
        .into());
    }
    require_discount_range(data.discount_percent)?;
    validate_status(data.status.as_deref())?;

    let updated = db::product::update_product(&state.pool, identity.vendor_id, product_id, &data).await?;
    Ok(Json(updated))
}

#[derive(serde::Deserialize)]
pub struct DeleteQuery {
    pub force: Option<bool>,
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<ApiResponse<()>> {
    let force = query.force.unwrap_or(false);
    db::product::delete_product(&state.pool, identity.vendor_id, product_id, force).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
) -> ApiResult<ProductWithVariants> {
    let product = db::product::get_with_variants(&state.pool, identity.vendor_id, product_id).await?;
    Ok(Json(product))
}

/// Same read as `get_product`, no mutation: the assembled product as it
/// would be published.
pub async fn preview_product(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
) -> ApiResult<ProductWithVariants> {
    let product = db::product::get_with_variants(&state.pool, identity.vendor_id, product_id).await?;
    Ok(Json(product))
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<i64>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ProductPage> {
    validate_status(query.status.as_deref())?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let result = db::product::list_products(
        &state.pool,
        identity.vendor_id,
        query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()),
        query.status.as_deref(),
        query.category_id,
        page,
        limit,
    )
    .await?;
    Ok(Json(result))
}

pub async fn set_pricing(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Path(product_id): Path<i64>,
    Json(data): Json<PricingUpdate>,
) -> ApiResult<PricingTarget> {
    if let Some(bp) = data.base_price
        && bp <= 0.0
    {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "base_price must be positive",
        )
        .into());
    }
    require_discount_range(data.discount_percent)?;

    let updated = db::product::set_pricing(&state.pool, identity.vendor_id, product_id, &data).await?;
    Ok(Json(updated))
}
