//! Request gate: rate limiting and CORS in front of every API route.
//!
//! Handlers can use the gate directly through [`RequestGate::admit`] and
//! [`RequestGate::finish`], or mount [`gate_middleware`] on a router so the
//! same contract is applied to each route uniformly.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::EndpointClass;
use crate::observability::metrics;
use crate::security::client_ip::client_ip;
use crate::security::cors::CorsPolicy;
use crate::security::rate_limit::{Admission, RateLimiter};

/// Admission control for one endpoint class.
#[derive(Debug, Clone)]
pub struct RequestGate {
    limiter: Arc<RateLimiter>,
    cors: Arc<CorsPolicy>,
    class: EndpointClass,
}

impl RequestGate {
    pub fn new(limiter: Arc<RateLimiter>, cors: Arc<CorsPolicy>, class: EndpointClass) -> Self {
        Self {
            limiter,
            cors,
            class,
        }
    }

    /// The same limiter and policy, accounted under another class.
    pub fn for_class(&self, class: EndpointClass) -> Self {
        Self {
            class,
            ..self.clone()
        }
    }

    pub fn class(&self) -> EndpointClass {
        self.class
    }

    /// Decide whether `request` may proceed.
    ///
    /// `Some(response)` must be returned to the client unmodified: it is a
    /// preflight answer or a 429, both already carrying CORS headers.
    /// `None` means proceed; pass the eventual response through
    /// [`RequestGate::finish`].
    pub fn admit<B>(&self, request: &axum::http::Request<B>) -> Option<Response> {
        let origin = request.headers().get(header::ORIGIN);

        if request.method() == Method::OPTIONS {
            metrics::record_admission(self.class, "preflight");
            return Some(self.cors.preflight(origin));
        }

        let client = client_ip(request.headers());
        let path = request.uri().path();

        match self.limiter.check(&client, path, self.class) {
            Admission::Admitted { count, limit, .. } => {
                tracing::trace!(client = %client, path, count, limit, "Request admitted");
                metrics::record_admission(self.class, "admitted");
                None
            }
            Admission::Rejected(exceeded) => {
                tracing::warn!(
                    client = %client,
                    path,
                    class = self.class.as_str(),
                    retry_after = exceeded.retry_after_secs,
                    "Rate limit exceeded"
                );
                metrics::record_admission(self.class, "rejected");
                let mut response = exceeded.into_response();
                self.cors.apply(origin, response.headers_mut());
                Some(response)
            }
        }
    }

    /// Attach CORS headers to a handler's response.
    pub fn finish(&self, request_origin: Option<&HeaderValue>, mut response: Response) -> Response {
        self.cors.apply(request_origin, response.headers_mut());
        response
    }
}

/// Middleware applying [`RequestGate`] to every route of a router.
pub async fn gate_middleware(
    State(gate): State<RequestGate>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(response) = gate.admit(&request) {
        return response;
    }

    let origin = request.headers().get(header::ORIGIN).cloned();
    let response = next.run(request).await;
    gate.finish(origin.as_ref(), response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RateLimitConfig, RateLimitRule};
    use crate::security::store::InMemoryStore;
    use crate::time::ManualClock;
    use axum::body::Body;
    use axum::http::StatusCode;

    fn gate(max: u32) -> RequestGate {
        let rules = RateLimitConfig {
            webhook: RateLimitRule::new(60_000, max),
            ..RateLimitConfig::default()
        };
        let limiter = RateLimiter::new(
            rules,
            Arc::new(InMemoryStore::new()),
            Arc::new(ManualClock::at_millis(0)),
        );
        RequestGate::new(
            Arc::new(limiter),
            Arc::new(CorsPolicy::default()),
            EndpointClass::Webhook,
        )
    }

    fn request(method: Method) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri("/api/webhook/cv")
            .header("x-real-ip", "1.2.3.4")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn preflight_never_consumes_quota() {
        let gate = gate(1);
        for _ in 0..5 {
            let response = gate.admit(&request(Method::OPTIONS)).unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["access-control-allow-origin"], "*");
        }
        assert!(gate.admit(&request(Method::POST)).is_none());
    }

    #[test]
    fn rejection_carries_cors_headers() {
        let gate = gate(1);
        assert!(gate.admit(&request(Method::GET)).is_none());

        let response = gate.admit(&request(Method::GET)).unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        for name in [
            "access-control-allow-origin",
            "access-control-allow-methods",
            "access-control-allow-headers",
            "access-control-max-age",
        ] {
            assert!(response.headers().contains_key(name), "missing {}", name);
        }
    }

    #[test]
    fn for_class_shares_the_store() {
        let webhook = gate(1);
        let api = webhook.for_class(EndpointClass::Api);
        assert_eq!(api.class(), EndpointClass::Api);

        assert!(webhook.admit(&request(Method::GET)).is_none());
        assert!(api.admit(&request(Method::GET)).is_none());
        assert_eq!(webhook.limiter.tracked_keys(), 1);
    }
}
