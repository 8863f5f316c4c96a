//! Production readiness diagnostics over a loaded [`GateConfig`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::loader::{
    ENV_ADMIN_API_KEY, ENV_ALLOWED_ORIGINS, ENV_BIND_ADDRESS, ENV_LOG_LEVEL, ENV_WEBHOOK_SECRET,
};
use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationReport, MIN_SECRET_LEN};

const REDACTED: &str = "***REDACTED***";

/// Score (in percent) at or above which a valid config counts as ready.
const READY_SCORE: f64 = 85.0;

/// The config as JSON with every secret replaced by a marker.
pub fn redacted(config: &GateConfig) -> Value {
    let mut value = serde_json::to_value(config).unwrap_or(Value::Null);
    for pointer in ["/webhook/secret", "/admin/api_key"] {
        if let Some(slot) = value.pointer_mut(pointer) {
            if !slot.is_null() {
                *slot = Value::String(REDACTED.to_string());
            }
        }
    }
    value
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub score: f64,
    pub checks: BTreeMap<&'static str, bool>,
    pub validation: ValidationReport,
    pub recommendations: Vec<&'static str>,
}

/// Weigh the config against what a public deployment needs.
pub fn readiness(config: &GateConfig) -> ReadinessReport {
    let validation = validate_config(config);
    let strong = |s: &Option<String>| s.as_deref().is_some_and(|s| s.len() >= MIN_SECRET_LEN);

    let mut checks = BTreeMap::new();
    checks.insert("webhook_secret", strong(&config.webhook.secret));
    checks.insert("admin_key", strong(&config.admin.api_key));
    checks.insert("origins_restricted", !config.cors.allowed_origins.is_empty());
    checks.insert(
        "https_origins",
        !config.cors.allowed_origins.is_empty()
            && config
                .cors
                .allowed_origins
                .iter()
                .all(|o| o.starts_with("https://")),
    );
    checks.insert("cv_seeded", config.cv.seed_path.is_some());

    let passed = checks.values().filter(|ok| **ok).count();
    let score = passed as f64 / checks.len() as f64 * 100.0;

    let mut recommendations = Vec::new();
    if !validation.errors.is_empty() {
        recommendations.push("Fix configuration errors");
    }
    if !validation.warnings.is_empty() {
        recommendations.push("Address configuration warnings");
    }
    if !checks["webhook_secret"] || !checks["admin_key"] {
        recommendations.push("Provision strong webhook and admin secrets");
    }
    if !checks["https_origins"] {
        recommendations.push("Restrict CORS to HTTPS origins");
    }

    ReadinessReport {
        ready: validation.valid && score >= READY_SCORE,
        score,
        checks,
        validation,
        recommendations,
    }
}

/// An environment file template listing every variable the gateway reads.
pub fn env_template() -> String {
    format!(
        "# cv-gateway environment\n\
         \n\
         # Webhook HMAC secret (min {len} chars)\n\
         {secret}=your-webhook-secret\n\
         \n\
         # Bearer token for admin routes (min {len} chars)\n\
         {admin}=your-admin-api-key\n\
         \n\
         # Comma-separated list of allowed CORS origins\n\
         {origins}=https://cv.example.org\n\
         \n\
         # Listener and logging\n\
         {bind}=0.0.0.0:3000\n\
         {level}=info\n",
        len = MIN_SECRET_LEN,
        secret = ENV_WEBHOOK_SECRET,
        admin = ENV_ADMIN_API_KEY,
        origins = ENV_ALLOWED_ORIGINS,
        bind = ENV_BIND_ADDRESS,
        level = ENV_LOG_LEVEL,
    )
}
