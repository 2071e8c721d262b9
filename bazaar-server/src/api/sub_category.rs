//! Sub-category endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::category::{SubCategory, SubCategoryCreate};

use crate::db;
use crate::state::AppState;

use super::ApiResult;

pub async fn create_sub_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(data): Json<SubCategoryCreate>,
) -> ApiResult<SubCategory> {
    if data.name.trim().is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "name is required").into());
    }
    let sub = db::sub_category::create_sub_category(&state.pool, category_id, &data).await?;
    Ok(Json(sub))
}

pub async fn list_sub_categories(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> ApiResult<Vec<SubCategory>> {
    let subs = db::sub_category::list_sub_categories(&state.pool, category_id).await?;
    Ok(Json(subs))
}

#[derive(serde::Deserialize)]
pub struct SubCategoryUpdateBody {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
}

pub async fn update_sub_category(
    State(state): State<AppState>,
    Path(sub_category_id): Path<i64>,
    Json(data): Json<SubCategoryUpdateBody>,
) -> ApiResult<SubCategory> {
    let sub = db::sub_category::update_sub_category(
        &state.pool,
        sub_category_id,
        data.description.as_deref(),
        data.image_url.as_deref(),
        data.display_order,
    )
    .await?;
    Ok(Json(sub))
}

pub async fn delete_sub_category(
    State(state): State<AppState>,
    Path(sub_category_id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    db::sub_category::delete_sub_category(&state.pool, sub_category_id).await?;
    Ok(Json(ApiResponse::ok()))
}
