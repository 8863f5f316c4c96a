//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Mount a request gate per endpoint class
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Bind server to listener and stop on shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    handler::Handler,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::{self, auth::admin_auth_middleware};
use crate::api;
use crate::config::{EndpointClass, GateConfig};
use crate::cv::{CvStore, CvStoreError};
use crate::http::request::{request_id_layers, RequestIdExt};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::cors::CorsPolicy;
use crate::security::{gate_middleware, InMemoryStore, RateLimiter, RequestGate, WebhookAuthenticator};
use crate::time::{Clock, SystemClock};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub limiter: Arc<RateLimiter>,
    pub webhook: Arc<WebhookAuthenticator>,
    pub cv: Arc<CvStore>,
    pub clock: Arc<dyn Clock>,
    pub started_at: Instant,
}

impl AppState {
    /// Build every subsystem from `config`, reading time from `clock`.
    pub fn new(config: GateConfig, clock: Arc<dyn Clock>) -> Result<Self, CvStoreError> {
        let limiter = RateLimiter::new(
            config.rate_limit.clone(),
            Arc::new(InMemoryStore::new()),
            clock.clone(),
        );
        let webhook = WebhookAuthenticator::new(&config.webhook, clock.clone());
        let cv = match &config.cv.seed_path {
            Some(path) => CvStore::from_seed_file(Path::new(path), clock.clone())?,
            None => CvStore::new(clock.clone()),
        };

        Ok(Self {
            config: Arc::new(config),
            limiter: Arc::new(limiter),
            webhook: Arc::new(webhook),
            cv: Arc::new(cv),
            clock,
            started_at: Instant::now(),
        })
    }
}

/// HTTP server for the CV site API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, CvStoreError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`HttpServer::new`] with an explicit time source.
    pub fn with_clock(config: GateConfig, clock: Arc<dyn Clock>) -> Result<Self, CvStoreError> {
        Ok(Self::from_state(AppState::new(config, clock)?))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// The fully layered router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let cors = Arc::new(CorsPolicy::new(&config.cors.allowed_origins));
    let gate = RequestGate::new(state.limiter.clone(), cors, EndpointClass::Api);
    let admin_only = middleware::from_fn_with_state(state.clone(), admin_auth_middleware);

    // Mounted inside each gate so 408 and 413 answers still get CORS headers.
    let limits = (
        RequestBodyLimitLayer::new(config.listener.max_body_bytes),
        TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.listener.request_timeout_secs),
        ),
    );

    let api_routes = Router::new()
        .route(
            "/api/cv",
            get(api::cv::get_cv).put(api::cv::put_cv.layer(admin_only.clone())),
        )
        .route(
            "/api/config/production",
            get(admin::handlers::production_config).route_layer(admin_only.clone()),
        )
        .layer(limits.clone())
        .layer(middleware::from_fn_with_state(
            gate.for_class(EndpointClass::Api),
            gate_middleware,
        ));

    let webhook_routes = Router::new()
        .route(
            "/api/webhook/cv",
            get(api::webhook::verify).post(api::webhook::receive),
        )
        .layer(limits.clone())
        .layer(middleware::from_fn_with_state(
            gate.for_class(EndpointClass::Webhook),
            gate_middleware,
        ));

    let auth_routes = Router::new()
        .route(
            "/api/admin/rate-limit",
            get(admin::handlers::rate_limit_status).route_layer(admin_only),
        )
        .layer(limits.clone())
        .layer(middleware::from_fn_with_state(
            gate.for_class(EndpointClass::Auth),
            gate_middleware,
        ));

    Router::new()
        .route("/api/health", get(api::health::health).route_layer(limits))
        .merge(api_routes)
        .merge(webhook_routes)
        .merge(auth_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(track_requests))
        .layer(request_id_layers())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Count every response by method and status.
async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    tracing::debug!(
        request_id = %request.request_id(),
        method = %method,
        path = %request.uri().path(),
        "Handling request"
    );

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
