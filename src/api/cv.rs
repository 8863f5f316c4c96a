use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::cv::{validate_section, CvRecord, CvStoreError, CvUpdate};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `GET /api/cv`: the latest CV.
pub async fn get_cv(State(state): State<AppState>) -> Result<Json<CvRecord>, ApiError> {
    state
        .cv
        .latest()
        .await
        .map(Json)
        .ok_or_else(|| CvStoreError::NotFound.into())
}

/// `PUT /api/cv`: replace one section. Admin only.
pub async fn put_cv(
    State(state): State<AppState>,
    Json(update): Json<CvUpdate>,
) -> Result<Json<Value>, ApiError> {
    let section = validate_section(&update.section, update.data)?;
    let name = section.section();
    let record = state.cv.replace_section(section).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("CV section '{}' updated successfully", name),
        "data": record,
    })))
}
