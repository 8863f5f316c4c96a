use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cv::{validate_section, CvUpdate};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::time::iso8601;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub challenge: Option<String>,
}

/// `GET /api/webhook/cv`: echo a verification challenge, or report liveness.
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Json<Value> {
    match query.challenge {
        Some(challenge) => Json(json!({ "challenge": challenge })),
        None => Json(json!({
            "message": "CV Webhook endpoint is active",
            "timestamp": iso8601(state.clock.now_millis()),
        })),
    }
}

/// `POST /api/webhook/cv`: a signed `{ section, data }` update.
///
/// The body is taken as raw bytes so the signature covers exactly what was
/// sent; JSON parsing only happens once it is authenticated.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if let Err(err) = state.webhook.authenticate(&headers, &body) {
        metrics::record_webhook_auth(err.outcome());
        tracing::warn!(reason = %err, outcome = err.outcome(), "Webhook rejected");
        return Err(err.into());
    }
    metrics::record_webhook_auth("accepted");

    let update: CvUpdate = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid update body: {}", e)))?;
    let section = validate_section(&update.section, update.data)?;
    let name = section.section();
    let record = state.cv.replace_section(section).await?;

    tracing::info!(section = %name, "CV updated via webhook");
    Ok(Json(json!({
        "success": true,
        "message": format!("CV section '{}' updated successfully", name),
        "updatedAt": record.updated_at,
    })))
}
