//! Verification session endpoints
//!
//! POST /api/verify/request — issue a code for an identifier
//! POST /api/verify/confirm — verify a submitted code

use axum::{Json, extract::State};
use shared::error::{ApiResponse, AppError};

use crate::state::AppState;

use super::ApiResult;

#[derive(serde::Deserialize)]
pub struct RequestCodeBody {
    pub identifier: String,
}

#[derive(serde::Deserialize)]
pub struct ConfirmCodeBody {
    pub identifier: String,
    pub code: String,
}

pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeBody>,
) -> ApiResult<ApiResponse<()>> {
    let identifier = body.identifier.trim().to_lowercase();
    if identifier.is_empty() {
        return Err(AppError::validation("identifier is required").into());
    }

    let code = state.verification.issue(&identifier).await;
    // Delivery (email/SMS) is an external collaborator; never in the response
    tracing::debug!(identifier = %identifier, code = %code, "verification code issued");

    Ok(Json(ApiResponse::ok()))
}

pub async fn confirm_code(
    State(state): State<AppState>,
    Json(body): Json<ConfirmCodeBody>,
) -> ApiResult<ApiResponse<()>> {
    let identifier = body.identifier.trim().to_lowercase();
    state
        .verification
        .verify(&identifier, body.code.trim())
        .await?;
    Ok(Json(ApiResponse::ok()))
}
