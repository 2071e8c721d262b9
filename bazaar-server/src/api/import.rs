//! Bulk import endpoints
//!
//! The multipart upload handler (external) stores the file and passes its
//! path here; the pipeline owns and deletes the file once the run starts.

use std::path::{Path as FsPath, PathBuf};

use axum::{Extension, Json, extract::State};
use shared::error::{AppError, ErrorCode};
use shared::models::import::ImportReport;

use crate::auth::vendor_auth::VendorIdentity;
use crate::services;
use crate::state::AppState;

use super::ApiResult;

#[derive(serde::Deserialize)]
pub struct ImportRequest {
    /// Stored file path from the upload handler, relative to the upload dir
    pub path: String,
}

fn resolve_upload_path(upload_dir: &str, path: &str) -> Result<PathBuf, AppError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(AppError::new(ErrorCode::NoFileProvided));
    }
    let p = PathBuf::from(path);
    Ok(if p.is_absolute() {
        p
    } else {
        FsPath::new(upload_dir).join(p)
    })
}

pub async fn import_products(
    State(state): State<AppState>,
    Extension(identity): Extension<VendorIdentity>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<ImportReport> {
    let path = resolve_upload_path(&state.upload_dir, &req.path)?;
    let report =
        services::import::import_products(&state.pool, identity.vendor_id, &path).await?;
    tracing::info!(
        total = report.total,
        imported = report.imported,
        skipped = report.skipped,
        "product import finished"
    );
    Ok(Json(report))
}

pub async fn import_categories(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<ImportReport> {
    let path = resolve_upload_path(&state.upload_dir, &req.path)?;
    let report = services::import::import_categories(&state.pool, &path).await?;
    tracing::info!(
        total = report.total,
        imported = report.imported,
        skipped = report.skipped,
        "category import finished"
    );
    Ok(Json(report))
}
