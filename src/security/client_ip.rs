//! Client identity derivation for rate-limit keys.
//!
//! Trust boundary: the headers below are set by whatever sits in front of
//! the gateway and are trivially spoofable by a direct client. They are only
//! meaningful when the gateway runs behind a trusted reverse proxy that
//! overwrites them. Every caller keying on [`client_ip`] inherits this
//! assumption.

use axum::http::HeaderMap;

/// Headers consulted in order; the first non-empty one wins.
pub const CLIENT_IP_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "x-client-ip"];

/// Identity used when no forwarding header is present.
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// Derive the client identity from forwarding headers.
///
/// `x-forwarded-for` may carry a proxy chain; only its first entry is used.
pub fn client_ip(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim())
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_CLIENT_IP)
        .to_string()
}
