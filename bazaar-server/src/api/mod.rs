//! API routes for bazaar-server

pub mod category;
pub mod health;
pub mod import;
pub mod product;
pub mod stock;
pub mod sub_category;
pub mod variant;
pub mod verify;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::trace::TraceLayer;

use crate::auth::vendor_auth::vendor_auth_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

/// Handler result: JSON payload or a service error
pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

/// Range check for discount percentages; the pricing calculator itself
/// does not clamp.
pub(crate) fn require_discount_range(discount: Option<f64>) -> Result<(), AppError> {
    if let Some(d) = discount
        && !(0.0..=100.0).contains(&d)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "discount_percent must be within 0-100",
        ));
    }
    Ok(())
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Vendor catalog management (JWT authenticated)
    let vendor = Router::new()
        .route(
            "/api/vendor/products",
            post(product::create_product).get(product::list_products),
        )
        .route(
            "/api/vendor/products/{product_id}",
            get(product::get_product)
                .put(product::update_product)
                .delete(product::delete_product),
        )
        .route(
            "/api/vendor/products/{product_id}/preview",
            get(product::preview_product),
        )
        .route(
            "/api/vendor/products/{product_id}/variants",
            post(variant::upsert_variant),
        )
        .route(
            "/api/vendor/products/{product_id}/stock",
            post(stock::adjust_stock),
        )
        .route(
            "/api/vendor/products/{product_id}/pricing",
            put(product::set_pricing),
        )
        .route("/api/vendor/products/import", post(import::import_products))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            vendor_auth_middleware,
        ));

    // Category tree management (JWT authenticated)
    let categories = Router::new()
        .route(
            "/api/categories",
            post(category::create_category).get(category::list_categories),
        )
        .route("/api/categories/import", post(import::import_categories))
        .route(
            "/api/categories/{category_id}",
            put(category::update_category).delete(category::delete_category),
        )
        .route(
            "/api/categories/{category_id}/subcategories",
            post(sub_category::create_sub_category).get(sub_category::list_sub_categories),
        )
        .route(
            "/api/subcategories/{sub_category_id}",
            put(sub_category::update_sub_category).delete(sub_category::delete_sub_category),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            vendor_auth_middleware,
        ));

    // Verification sessions (no auth: pre-login flow)
    let verification = Router::new()
        .route("/api/verify/request", post(verify::request_code))
        .route("/api/verify/confirm", post(verify::confirm_code));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(vendor)
        .merge(categories)
        .merge(verification)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
