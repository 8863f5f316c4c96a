//! Configuration validation.
//!
//! Serde handles the syntactic side; this module runs the semantic checks and
//! reports every problem at once. Errors block startup, warnings are logged
//! and surfaced by the production diagnostics endpoint.

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

use crate::config::schema::GateConfig;

/// Minimum recommended length for shared secrets.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

/// Run every semantic check against `config`.
pub fn validate_config(config: &GateConfig) -> ValidationReport {
    let mut findings = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        findings.push(ValidationError::error(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        findings.push(ValidationError::error(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    for (class, rule) in config.rate_limit.rules() {
        let field = format!("rate_limit.{}", class.as_str());
        if rule.window_ms == 0 {
            findings.push(ValidationError::error(
                format!("{}.window_ms", field),
                "must be greater than zero",
            ));
        }
        if rule.max_requests == 0 {
            findings.push(ValidationError::error(
                format!("{}.max_requests", field),
                "must be greater than zero",
            ));
        }
    }

    if config.webhook.tolerance_secs == 0 {
        findings.push(ValidationError::error(
            "webhook.tolerance_secs",
            "must be greater than zero",
        ));
    }
    check_secret(&mut findings, "webhook.secret", config.webhook.secret.as_deref());
    check_secret(&mut findings, "admin.api_key", config.admin.api_key.as_deref());

    if config.cors.allowed_origins.is_empty() {
        findings.push(ValidationError::warning(
            "cors.allowed_origins",
            "not set - any origin is allowed",
        ));
    }
    for origin in &config.cors.allowed_origins {
        if url::Url::parse(origin).is_err() {
            findings.push(ValidationError::error(
                "cors.allowed_origins",
                format!("'{}' is not a valid origin", origin),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        findings.push(ValidationError::error(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    let (errors, warnings): (Vec<_>, Vec<_>) =
        findings.into_iter().partition(ValidationError::is_error);
    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_secret(findings: &mut Vec<ValidationError>, field: &str, secret: Option<&str>) {
    match secret {
        None | Some("") => {
            findings.push(ValidationError::warning(field, "not configured"));
        }
        Some(s) if s.len() < MIN_SECRET_LEN => {
            findings.push(ValidationError::warning(
                field,
                format!("should be at least {} characters long", MIN_SECRET_LEN),
            ));
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RateLimitRule;

    fn complete_config() -> GateConfig {
        let mut config = GateConfig::default();
        config.webhook.secret = Some("w".repeat(40));
        config.admin.api_key = Some("a".repeat(40));
        config.cors.allowed_origins = vec!["https://cv.example.org".into()];
        config
    }

    #[test]
    fn complete_config_is_clean() {
        let report = validate_config(&complete_config());
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn reports_every_error_not_just_first() {
        let mut config = complete_config();
        config.rate_limit.api = RateLimitRule::new(0, 0);
        config.webhook.tolerance_secs = 0;
        config.listener.bind_address = "nowhere".into();

        let report = validate_config(&config);
        assert!(!report.valid);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "rate_limit.api.window_ms",
                "rate_limit.api.max_requests",
                "webhook.tolerance_secs",
            ]
        );
    }

    #[test]
    fn short_or_missing_secrets_only_warn() {
        let mut config = complete_config();
        config.webhook.secret = Some("short".into());
        config.admin.api_key = None;

        let report = validate_config(&config);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].field, "webhook.secret");
        assert_eq!(report.warnings[1].message, "not configured");
    }
}
