use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::security::compare::timing_safe_eq;

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state
        .config
        .admin
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or(ApiError::ConfigurationMissing("admin api key"))?;

    match bearer_token(request.headers()) {
        Some(token) if timing_safe_eq(token.as_bytes(), expected.as_bytes()) => {
            Ok(next.run(request).await)
        }
        presented => {
            tracing::warn!(
                path = %request.uri().path(),
                token_present = presented.is_some(),
                "Admin authentication failed"
            );
            Err(ApiError::Unauthorized)
        }
    }
}
