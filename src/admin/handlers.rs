use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{diagnostics, validate_config, EndpointClass};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::time::iso8601;

#[derive(Debug, Deserialize)]
pub struct ProductionQuery {
    pub action: Option<String>,
}

/// `GET /api/config/production?action=config|validate|readiness|template`.
///
/// Any other action, or none, returns the combined status overview.
pub async fn production_config(
    State(state): State<AppState>,
    Query(query): Query<ProductionQuery>,
) -> Result<Json<Value>, ApiError> {
    let config = state.config.as_ref();

    let (data, message) = match query.action.as_deref() {
        Some("config") => (
            diagnostics::redacted(config),
            "Production configuration retrieved (sensitive data redacted)",
        ),
        Some("validate") => (
            to_json(&validate_config(config))?,
            "Production configuration validation completed",
        ),
        Some("readiness") => (
            to_json(&diagnostics::readiness(config))?,
            "Production readiness check completed",
        ),
        Some("template") => (
            json!({ "template": diagnostics::env_template() }),
            "Production environment template generated",
        ),
        _ => {
            let readiness = diagnostics::readiness(config);
            let summary = json!({
                "ready": readiness.ready,
                "score": readiness.score,
                "errors": readiness.validation.errors.len(),
                "warnings": readiness.validation.warnings.len(),
            });
            (
                json!({ "readiness": to_json(&readiness)?, "summary": summary }),
                "Production status overview retrieved",
            )
        }
    };

    Ok(Json(json!({ "success": true, "data": data, "message": message })))
}

#[derive(Debug, Deserialize)]
pub struct RateLimitQuery {
    pub ip: Option<String>,
    pub endpoint: Option<String>,
    pub class: Option<EndpointClass>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitReport {
    pub client: String,
    pub endpoint: String,
    pub class: EndpointClass,
    pub remaining: u32,
    pub limit: u32,
    pub window_ms: u64,
    pub reset_at: String,
}

/// `GET /api/admin/rate-limit?ip=&endpoint=&class=`: quota left for a
/// client on an endpoint, without consuming any.
pub async fn rate_limit_status(
    State(state): State<AppState>,
    Query(query): Query<RateLimitQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(client), Some(endpoint)) = (query.ip, query.endpoint) else {
        return Err(ApiError::BadRequest(
            "Query parameters 'ip' and 'endpoint' are required".to_string(),
        ));
    };
    let class = query.class.unwrap_or(EndpointClass::Api);

    let status = state.limiter.status(&client, &endpoint, class);
    let report = RateLimitReport {
        window_ms: state.limiter.rule(class).window_ms,
        reset_at: iso8601(status.reset_at_ms),
        remaining: status.remaining,
        limit: status.limit,
        client,
        endpoint,
        class,
    };

    Ok(Json(json!({ "success": true, "data": report })))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}
