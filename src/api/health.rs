use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::time::iso8601;

pub const HEALTH_CHECK_HEADER: HeaderName = HeaderName::from_static("x-health-check");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub services: Services,
    pub cv_records: usize,
    pub rate_limit_keys: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    pub webhook: bool,
    pub admin: bool,
    pub metrics: bool,
}

/// `GET /api/health`: liveness plus which secrets are provisioned.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    let report = HealthReport {
        status: "healthy",
        timestamp: iso8601(state.clock.now_millis()),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        services: Services {
            webhook: state.webhook.is_configured(),
            admin: config.admin.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            metrics: config.observability.metrics_enabled,
        },
        cv_records: state.cv.len().await,
        rate_limit_keys: state.limiter.tracked_keys(),
    };

    (
        [
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ),
            (HEALTH_CHECK_HEADER, HeaderValue::from_static("cv-gateway")),
        ],
        Json(report),
    )
}
