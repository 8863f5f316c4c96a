//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, request limits).
    pub listener: ListenerConfig,

    /// Rate limits per endpoint class.
    pub rate_limit: RateLimitConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Webhook authentication settings.
    pub webhook: WebhookConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// CV record settings.
    pub cv: CvConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Logical endpoint class. Each class carries its own window and quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
    Api,
    Webhook,
    Auth,
    Strict,
}

impl EndpointClass {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointClass::Api => "api",
            EndpointClass::Webhook => "webhook",
            EndpointClass::Auth => "auth",
            EndpointClass::Strict => "strict",
        }
    }
}

impl std::str::FromStr for EndpointClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(EndpointClass::Api),
            "webhook" => Ok(EndpointClass::Webhook),
            "auth" => Ok(EndpointClass::Auth),
            "strict" => Ok(EndpointClass::Strict),
            other => Err(format!("unknown endpoint class '{}'", other)),
        }
    }
}

/// A fixed-window quota.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitRule {
    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests admitted per window.
    pub max_requests: u32,

    /// Overrides the default rejection message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateLimitRule {
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Rate limiting configuration, one rule per endpoint class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// General API routes: 100 requests per 15 minutes.
    pub api: RateLimitRule,

    /// Webhook receivers: 10 requests per minute.
    pub webhook: RateLimitRule,

    /// Credential-checking routes: 5 requests per 15 minutes.
    pub auth: RateLimitRule,

    /// One-shot operations: 1 request per minute.
    ///
    /// No built-in route is gated under this class. It is reserved for
    /// one-shot routes and for [`RateLimiter::check`] calls made directly by
    /// handlers, and is reachable through the rate-limit status endpoint.
    ///
    /// [`RateLimiter::check`]: crate::security::RateLimiter::check
    pub strict: RateLimitRule,
}

impl RateLimitConfig {
    pub fn rule(&self, class: EndpointClass) -> &RateLimitRule {
        match class {
            EndpointClass::Api => &self.api,
            EndpointClass::Webhook => &self.webhook,
            EndpointClass::Auth => &self.auth,
            EndpointClass::Strict => &self.strict,
        }
    }

    pub fn rules(&self) -> [(EndpointClass, &RateLimitRule); 4] {
        [
            (EndpointClass::Api, &self.api),
            (EndpointClass::Webhook, &self.webhook),
            (EndpointClass::Auth, &self.auth),
            (EndpointClass::Strict, &self.strict),
        ]
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            api: RateLimitRule::new(15 * 60 * 1000, 100),
            webhook: RateLimitRule::new(60 * 1000, 10),
            auth: RateLimitRule::new(15 * 60 * 1000, 5),
            strict: RateLimitRule::new(60 * 1000, 1),
        }
    }
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty means any origin (`*`).
    pub allowed_origins: Vec<String>,
}

/// Webhook authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared HMAC secret. Usually supplied through `WEBHOOK_SECRET`.
    pub secret: Option<String>,

    /// Accepted clock skew for the `x-timestamp` header, in seconds.
    pub tolerance_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            tolerance_secs: 300,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token for admin routes. Usually supplied through `ADMIN_API_KEY`.
    pub api_key: Option<String>,
}

/// CV record configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CvConfig {
    /// JSON file loaded into the record store at startup.
    pub seed_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            [rate_limit.webhook]
            window_ms = 30000
            max_requests = 3
            message = "slow down"

            [cors]
            allowed_origins = ["https://cv.example.org"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.webhook.max_requests, 3);
        assert_eq!(config.rate_limit.webhook.message.as_deref(), Some("slow down"));
        assert_eq!(config.rate_limit.api, RateLimitRule::new(900_000, 100));
        assert_eq!(config.webhook.tolerance_secs, 300);
        assert_eq!(config.cors.allowed_origins, vec!["https://cv.example.org"]);
    }

    #[test]
    fn endpoint_class_round_trips_through_str() {
        for (class, _) in RateLimitConfig::default().rules() {
            assert_eq!(class.as_str().parse::<EndpointClass>().unwrap(), class);
        }
        assert!("bogus".parse::<EndpointClass>().is_err());
    }
}
