//! Fixed-window rate limiting per `(client, endpoint)` key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::{EndpointClass, RateLimitConfig, RateLimitRule};
use crate::security::store::{RateLimitEntry, RateLimitStore};
use crate::time::{iso8601, Clock};

/// Rejection message used when a rule carries none.
pub const DEFAULT_MESSAGE: &str = "Too many requests";

/// Minimum spacing between two sweeps of the store.
pub const SWEEP_INTERVAL_MS: u64 = 1_000;

/// Outcome of a single admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted {
        count: u32,
        limit: u32,
        reset_at_ms: u64,
    },
    Rejected(RateLimitExceeded),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// A request over quota. Renders as HTTP 429.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitExceeded {
    pub message: String,
    pub retry_after_secs: u64,
    pub limit: u32,
    pub window_ms: u64,
    pub reset_at_ms: u64,
}

impl RateLimitExceeded {
    fn new(rule: &RateLimitRule, reset_at_ms: u64, now_ms: u64) -> Self {
        Self {
            message: rule
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            retry_after_secs: reset_at_ms.saturating_sub(now_ms).div_ceil(1000),
            limit: rule.max_requests,
            window_ms: rule.window_ms,
            reset_at_ms,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody<'a> {
    error: &'a str,
    retry_after: u64,
    limit: u32,
    window_ms: u64,
}

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        let body = RateLimitBody {
            error: &self.message,
            retry_after: self.retry_after_secs,
            limit: self.limit,
            window_ms: self.window_ms,
        };
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_secs));
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        if let Ok(reset) = HeaderValue::from_str(&iso8601(self.reset_at_ms)) {
            headers.insert("x-ratelimit-reset", reset);
        }
        response
    }
}

/// Read-only view of a key's quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub reset_at_ms: u64,
    pub limit: u32,
}

/// Composite store key for a client hitting an endpoint.
pub fn rate_limit_key(client: &str, endpoint: &str) -> String {
    format!("{}:{}", client, endpoint)
}

/// Process-wide limiter over an injectable store.
#[derive(Debug)]
pub struct RateLimiter {
    rules: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    next_sweep_ms: AtomicU64,
}

impl RateLimiter {
    pub fn new(rules: RateLimitConfig, store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            store,
            clock,
            next_sweep_ms: AtomicU64::new(0),
        }
    }

    pub fn rule(&self, class: EndpointClass) -> &RateLimitRule {
        self.rules.rule(class)
    }

    /// Number of keys currently held by the store.
    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }

    /// Count a request from `client` to `endpoint` against the class's rule.
    pub fn check(&self, client: &str, endpoint: &str, class: EndpointClass) -> Admission {
        self.check_rule(client, endpoint, self.rules.rule(class))
    }

    /// Count a request against an explicit rule.
    ///
    /// A rejected request leaves the stored entry untouched.
    pub fn check_rule(&self, client: &str, endpoint: &str, rule: &RateLimitRule) -> Admission {
        let now = self.clock.now_millis();

        self.sweep_expired(now);

        let key = rate_limit_key(client, endpoint);
        let fresh = RateLimitEntry {
            count: 1,
            reset_at_ms: now.saturating_add(rule.window_ms),
        };
        let mut rejected = false;

        let entry = self
            .store
            .compute(&key, &mut |current| match current {
                Some(entry) if !entry.is_expired(now) && entry.count >= rule.max_requests => {
                    rejected = true;
                    Some(entry)
                }
                Some(entry) if !entry.is_expired(now) => Some(RateLimitEntry {
                    count: entry.count + 1,
                    ..entry
                }),
                _ => Some(fresh),
            })
            .unwrap_or(fresh);

        if rejected {
            Admission::Rejected(RateLimitExceeded::new(rule, entry.reset_at_ms, now))
        } else {
            Admission::Admitted {
                count: entry.count,
                limit: rule.max_requests,
                reset_at_ms: entry.reset_at_ms,
            }
        }
    }

    /// Sweep the store at most once per [`SWEEP_INTERVAL_MS`].
    fn sweep_expired(&self, now: u64) {
        let due = self.next_sweep_ms.load(Ordering::Relaxed);
        if now < due {
            return;
        }
        let next = now.saturating_add(SWEEP_INTERVAL_MS);
        if self
            .next_sweep_ms
            .compare_exchange(due, next, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let swept = self.store.sweep(now);
        if swept > 0 {
            tracing::trace!(swept, "Expired rate-limit entries removed");
        }
    }

    /// Quota left for a key without counting a request.
    pub fn status(&self, client: &str, endpoint: &str, class: EndpointClass) -> RateLimitStatus {
        let rule = self.rules.rule(class);
        let now = self.clock.now_millis();

        match self.store.get(&rate_limit_key(client, endpoint)) {
            Some(entry) if !entry.is_expired(now) => RateLimitStatus {
                remaining: rule.max_requests.saturating_sub(entry.count),
                reset_at_ms: entry.reset_at_ms,
                limit: rule.max_requests,
            },
            _ => RateLimitStatus {
                remaining: rule.max_requests,
                reset_at_ms: now.saturating_add(rule.window_ms),
                limit: rule.max_requests,
            },
        }
    }
}
