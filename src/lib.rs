//! Request gate and webhook authentication for a personal CV site.
//!
//! Every public API route passes a per-client fixed-window rate limiter and
//! receives uniform CORS headers; the CV update webhook additionally
//! requires an HMAC-SHA256 signature over the raw body with a fresh
//! timestamp.

pub mod admin;
pub mod api;
pub mod config;
pub mod cv;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod time;

pub use config::schema::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
