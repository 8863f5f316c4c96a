//! Error responses.
//!
//! Every handler error becomes a JSON body `{ "success": false, "error": ... }`
//! with a status chosen here. Internal details are logged, not returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cv::{CvStoreError, CvValidationError};
use crate::security::WebhookAuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server configuration error")]
    ConfigurationMissing(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ConfigurationMissing(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::ConfigurationMissing(what) => {
                tracing::error!(missing = *what, "Server configuration error");
            }
            ApiError::Internal(detail) => tracing::error!(error = %detail, "Internal error"),
            _ => {}
        }
        let body = json!({ "success": false, "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<WebhookAuthError> for ApiError {
    fn from(err: WebhookAuthError) -> Self {
        match err {
            WebhookAuthError::ConfigurationMissing => ApiError::ConfigurationMissing("webhook secret"),
            WebhookAuthError::Internal(detail) => ApiError::Internal(detail),
            WebhookAuthError::MissingHeaders
            | WebhookAuthError::StaleOrInvalidTimestamp
            | WebhookAuthError::SignatureMismatch => ApiError::Unauthorized,
        }
    }
}

impl From<CvValidationError> for ApiError {
    fn from(err: CvValidationError) -> Self {
        ApiError::BadRequest(format!("Data validation failed: {}", err))
    }
}

impl From<CvStoreError> for ApiError {
    fn from(err: CvStoreError) -> Self {
        match err {
            CvStoreError::NotFound => ApiError::NotFound("CV not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
