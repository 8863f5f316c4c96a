//! Webhook authentication: HMAC-SHA256 signatures with replay protection.
//!
//! A sender signs the exact request body with the shared secret and sends
//!
//! ```text
//! x-signature-256: sha256=<hex hmac-sha256(secret, body)>
//! x-timestamp:     <unix seconds>
//! ```
//!
//! The receiver recomputes the signature over the raw bytes it received
//! (before any JSON parsing) and refuses timestamps outside the tolerance
//! window, so a captured request cannot be replayed indefinitely. Replays
//! inside the window are not detected here.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::config::WebhookConfig;
use crate::security::compare::timing_safe_eq;
use crate::time::Clock;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-signature-256";
/// Hub-style alternative, consulted when [`SIGNATURE_HEADER`] is absent.
pub const HUB_SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_PREFIX: &str = "sha256=";
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Why a webhook was refused.
///
/// The distinction is for logs and metrics only: every caller-side failure
/// is answered with the same 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookAuthError {
    #[error("missing required webhook headers")]
    MissingHeaders,

    #[error("webhook timestamp is invalid or expired")]
    StaleOrInvalidTimestamp,

    #[error("webhook signature verification failed")]
    SignatureMismatch,

    #[error("webhook secret is not configured")]
    ConfigurationMissing,

    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl WebhookAuthError {
    /// Status exposed on the wire.
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookAuthError::MissingHeaders
            | WebhookAuthError::StaleOrInvalidTimestamp
            | WebhookAuthError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            WebhookAuthError::ConfigurationMissing | WebhookAuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            WebhookAuthError::MissingHeaders => "missing_headers",
            WebhookAuthError::StaleOrInvalidTimestamp => "stale_timestamp",
            WebhookAuthError::SignatureMismatch => "signature_mismatch",
            WebhookAuthError::ConfigurationMissing => "not_configured",
            WebhookAuthError::Internal(_) => "internal",
        }
    }
}

/// Produce the `x-signature-256` value for `payload`.
pub fn sign(payload: &[u8], secret: &str) -> Result<String, WebhookAuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookAuthError::Internal(e.to_string()))?;
    mac.update(payload);
    Ok(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check `signature` against the expected signature for `payload`.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> Result<(), WebhookAuthError> {
    let expected = sign(payload, secret)?;
    if timing_safe_eq(signature.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(WebhookAuthError::SignatureMismatch)
    }
}

/// Accept `timestamp` (decimal Unix seconds) when within `tolerance_secs`
/// of `now_secs`, in either direction.
pub fn validate_timestamp(
    timestamp: &str,
    now_secs: i64,
    tolerance_secs: u64,
) -> Result<(), WebhookAuthError> {
    let sent: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| WebhookAuthError::StaleOrInvalidTimestamp)?;

    if now_secs.abs_diff(sent) <= tolerance_secs {
        Ok(())
    } else {
        Err(WebhookAuthError::StaleOrInvalidTimestamp)
    }
}

/// Signature and timestamp pulled from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookHeaders<'a> {
    pub signature: &'a str,
    pub timestamp: &'a str,
}

/// Pull the signature (primary header, then hub-style) and timestamp.
pub fn extract_headers(headers: &HeaderMap) -> Result<WebhookHeaders<'_>, WebhookAuthError> {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };

    let signature = text(SIGNATURE_HEADER).or_else(|| text(HUB_SIGNATURE_HEADER));
    match (signature, text(TIMESTAMP_HEADER)) {
        (Some(signature), Some(timestamp)) => Ok(WebhookHeaders {
            signature,
            timestamp,
        }),
        _ => Err(WebhookAuthError::MissingHeaders),
    }
}

/// Verifies inbound webhooks against the configured secret.
#[derive(Debug, Clone)]
pub struct WebhookAuthenticator {
    secret: Option<String>,
    tolerance_secs: u64,
    clock: Arc<dyn Clock>,
}

impl WebhookAuthenticator {
    pub fn new(config: &WebhookConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: config.secret.clone().filter(|s| !s.is_empty()),
            tolerance_secs: config.tolerance_secs,
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Authenticate a request from its headers and raw body bytes.
    pub fn authenticate(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookAuthError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(WebhookAuthError::ConfigurationMissing)?;

        let WebhookHeaders {
            signature,
            timestamp,
        } = extract_headers(headers)?;
        validate_timestamp(timestamp, self.clock.now_secs(), self.tolerance_secs)?;
        verify_signature(body, signature, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use axum::http::HeaderValue;

    const NOW: i64 = 1_700_000_000;
    const SECRET: &str = "s3cr3t";
    const PAYLOAD: &[u8] = br#"{"section":"skills"}"#;

    fn authenticator(secret: Option<&str>) -> WebhookAuthenticator {
        let config = WebhookConfig {
            secret: secret.map(str::to_string),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        };
        let clock = ManualClock::at_millis(NOW as u64 * 1000);
        WebhookAuthenticator::new(&config, Arc::new(clock))
    }

    fn signed_headers(signature: &str, timestamp: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(signature).unwrap());
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from(timestamp));
        headers
    }

    #[test]
    fn sign_matches_known_vector() {
        // RFC 4231 test case 2.
        let signature = sign(b"what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(
            signature,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn signed_request_within_tolerance_is_accepted() {
        let signature = sign(PAYLOAD, SECRET).unwrap();
        let auth = authenticator(Some(SECRET));
        assert_eq!(auth.authenticate(&signed_headers(&signature, NOW), PAYLOAD), Ok(()));
        assert_eq!(
            auth.authenticate(&signed_headers(&signature, NOW - 300), PAYLOAD),
            Ok(())
        );
    }

    #[test]
    fn one_changed_character_fails() {
        let signature = sign(PAYLOAD, SECRET).unwrap();
        let tampered = br#"{"section":"skillz"}"#;
        assert_eq!(
            authenticator(Some(SECRET)).authenticate(&signed_headers(&signature, NOW), tampered),
            Err(WebhookAuthError::SignatureMismatch)
        );
    }

    #[test]
    fn stale_or_future_timestamp_fails_even_with_valid_signature() {
        let signature = sign(PAYLOAD, SECRET).unwrap();
        let auth = authenticator(Some(SECRET));
        for ts in [NOW - 400, NOW + 301] {
            assert_eq!(
                auth.authenticate(&signed_headers(&signature, ts), PAYLOAD),
                Err(WebhookAuthError::StaleOrInvalidTimestamp)
            );
        }
    }

    #[test]
    fn unparseable_timestamp_fails() {
        assert_eq!(
            validate_timestamp("soon", NOW, 300),
            Err(WebhookAuthError::StaleOrInvalidTimestamp)
        );
        assert_eq!(
            validate_timestamp("1700000000abc", NOW, 300),
            Err(WebhookAuthError::StaleOrInvalidTimestamp)
        );
    }

    #[test]
    fn missing_headers_are_reported() {
        let auth = authenticator(Some(SECRET));
        assert_eq!(
            auth.authenticate(&HeaderMap::new(), PAYLOAD),
            Err(WebhookAuthError::MissingHeaders)
        );

        let mut only_signature = HeaderMap::new();
        only_signature.insert(SIGNATURE_HEADER, HeaderValue::from_static("sha256=00"));
        assert_eq!(
            auth.authenticate(&only_signature, PAYLOAD),
            Err(WebhookAuthError::MissingHeaders)
        );
    }

    #[test]
    fn hub_signature_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HUB_SIGNATURE_HEADER,
            HeaderValue::from_str(&sign(PAYLOAD, SECRET).unwrap()).unwrap(),
        );
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from(NOW));
        assert_eq!(authenticator(Some(SECRET)).authenticate(&headers, PAYLOAD), Ok(()));
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = authenticator(None)
            .authenticate(&signed_headers("sha256=00", NOW), PAYLOAD)
            .unwrap_err();
        assert_eq!(err, WebhookAuthError::ConfigurationMissing);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!authenticator(Some("")).is_configured());
    }

    #[test]
    fn caller_errors_collapse_to_401() {
        for err in [
            WebhookAuthError::MissingHeaders,
            WebhookAuthError::StaleOrInvalidTimestamp,
            WebhookAuthError::SignatureMismatch,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn truncated_signature_is_a_mismatch() {
        let signature = sign(PAYLOAD, SECRET).unwrap();
        assert_eq!(
            verify_signature(PAYLOAD, &signature[..signature.len() - 1], SECRET),
            Err(WebhookAuthError::SignatureMismatch)
        );
    }
}
