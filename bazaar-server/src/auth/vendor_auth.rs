//! Vendor JWT authentication for the catalog API
//!
//! The surrounding gateway owns the login flow; this middleware only
//! decodes and verifies the bearer token and exposes the vendor identity
//! to handlers as a request extension.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// JWT claims for vendor authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct VendorClaims {
    /// Vendor ID
    pub sub: i64,
    /// Vendor email
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated vendor identity extracted from JWT
#[derive(Debug, Clone)]
pub struct VendorIdentity {
    pub vendor_id: i64,
    pub email: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a vendor
pub fn create_token(
    vendor_id: i64,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = VendorClaims {
        sub: vendor_id,
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that extracts and verifies the vendor JWT from the
/// Authorization header
pub async fn vendor_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| error_response(401, "Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| error_response(401, "Invalid Authorization format"))?;

    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<VendorClaims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        error_response(401, "Invalid or expired token")
    })?;

    let identity = VendorIdentity {
        vendor_id: token_data.claims.sub,
        email: token_data.claims.email,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

fn error_response(status: u16, message: &str) -> Response {
    let body = serde_json::json!({ "error": message });
    let status =
        http::StatusCode::from_u16(status).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = create_token(42, "vendor@example.com", "test-secret").unwrap();
        let decoded = jsonwebtoken::decode::<VendorClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, 42);
        assert_eq!(decoded.claims.email, "vendor@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(42, "vendor@example.com", "test-secret").unwrap();
        let result = jsonwebtoken::decode::<VendorClaims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
