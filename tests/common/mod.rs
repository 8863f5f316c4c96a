//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::{json, Value};

use cv_gateway::config::{GateConfig, RateLimitRule};
use cv_gateway::cv::CvData;
use cv_gateway::http::{AppState, HttpServer};
use cv_gateway::security::webhook::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use cv_gateway::time::ManualClock;

pub const SECRET: &str = "s3cr3t";
pub const ADMIN_KEY: &str = "admin-key-for-tests-0123456789abcdef";
pub const CLIENT_IP: &str = "1.2.3.4";
/// 2023-11-14T22:13:20Z
pub const NOW_MS: u64 = 1_700_000_000_000;
pub const NOW_SECS: i64 = 1_700_000_000;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: ManualClock,
}

/// Secrets provisioned, generous limits everywhere except where a test
/// narrows them.
pub fn test_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.webhook.secret = Some(SECRET.to_string());
    config.admin.api_key = Some(ADMIN_KEY.to_string());
    config.rate_limit.api = RateLimitRule::new(60_000, 1_000);
    config.rate_limit.webhook = RateLimitRule::new(60_000, 1_000);
    config.rate_limit.auth = RateLimitRule::new(60_000, 1_000);
    config
}

/// Build the app around a manual clock and seed the sample CV.
pub async fn spawn_app(config: GateConfig) -> TestApp {
    let clock = ManualClock::at_millis(NOW_MS);
    let server = HttpServer::with_clock(config, Arc::new(clock.clone())).unwrap();
    let cv: CvData = serde_json::from_value(sample_cv()).unwrap();
    server.state().cv.replace(cv).await;

    TestApp {
        router: server.router(),
        state: server.state().clone(),
        clock,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::empty())
        .unwrap()
}

pub fn admin_get(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP)
        .header("authorization", format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap()
}

/// POST to the webhook with a signature over `body` and timestamp `ts`.
pub fn signed_webhook(body: &str, secret: &str, ts: i64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhook/cv")
        .header("x-forwarded-for", CLIENT_IP)
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(body.as_bytes(), secret).unwrap())
        .header(TIMESTAMP_HEADER, ts.to_string())
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn skills_update() -> Value {
    json!({
        "section": "skills",
        "data": [{
            "id": "backend",
            "category": "Backend",
            "skills": [{ "name": "Rust", "level": "Expert", "years": 5 }]
        }]
    })
}

pub fn sample_cv() -> Value {
    json!({
        "personalInfo": {
            "name": "Ada Lovelace",
            "title": "Analyst",
            "email": "ada@example.org",
            "phone": "+44 20 7946 0000",
            "location": "London",
            "photo": "https://cv.example.org/ada.jpg",
            "summary": "Mathematician and writer, known for work on the Analytical Engine.",
            "links": {
                "portfolio": "https://ada.example.org",
                "linkedin": "https://linkedin.com/in/ada",
                "github": "https://github.com/ada",
                "youtube": "https://youtube.com/@ada",
                "instagram": "https://instagram.com/ada",
                "artstation": "https://artstation.com/ada"
            }
        },
        "workExperience": [],
        "education": [],
        "skills": [],
        "projects": [],
        "courses": [],
        "languages": [{ "id": "en", "name": "English", "level": "Native" }]
    })
}
