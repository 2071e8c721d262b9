//! Category endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::category::{Category, CategoryCreate, CategoryUpdate, CategoryWithSubs};

use crate::db;
use crate::state::AppState;

use super::ApiResult;

pub async fn create_category(
    State(state): State<AppState>,
    Json(data): Json<CategoryCreate>,
) -> ApiResult<Category> {
    if data.name.trim().is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "name is required").into());
    }
    let category = db::category::create_category(&state.pool, &data).await?;
    Ok(Json(category))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryWithSubs>> {
    let categories = db::category::list_with_subs(&state.pool).await?;
    Ok(Json(categories))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(data): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    let category = db::category::update_category(&state.pool, category_id, &data).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    db::category::delete_category(&state.pool, category_id).await?;
    Ok(Json(ApiResponse::ok()))
}
