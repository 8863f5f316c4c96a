//! Cross-origin response headers.
//!
//! Every gated response carries the same header set: admitted, rejected and
//! preflight alike. Preflight answers are built here and never reach the
//! limiter.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Signature-256, X-Timestamp";
pub const MAX_AGE_SECS: &str = "86400";

/// The configured origin allow-list.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<HeaderValue>,
}

impl CorsPolicy {
    /// Build from configured origins. Entries that are not valid header
    /// values are dropped.
    pub fn new(origins: &[String]) -> Self {
        let allowed_origins = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim_end_matches('/')) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unusable CORS origin");
                    None
                }
            })
            .collect();
        Self { allowed_origins }
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty()
    }

    /// `*` when unrestricted; the caller's origin when listed; otherwise the
    /// first configured origin, which a browser will refuse to match.
    pub fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> HeaderValue {
        let Some(first) = self.allowed_origins.first() else {
            return HeaderValue::from_static("*");
        };
        request_origin
            .and_then(|origin| self.allowed_origins.iter().find(|allowed| *allowed == origin))
            .unwrap_or(first)
            .clone()
    }

    /// Merge the CORS header set into `headers`.
    pub fn apply(&self, request_origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin(request_origin),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
        if !self.allows_any() {
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }

    /// Empty 200 answer to an `OPTIONS` preflight.
    pub fn preflight(&self, request_origin: Option<&HeaderValue>) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        self.apply(request_origin, response.headers_mut());
        response
    }
}
