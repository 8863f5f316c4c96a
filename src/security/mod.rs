//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request to a gated route:
//!     → gate.rs (OPTIONS? answer preflight)
//!     → client_ip.rs (derive client identity)
//!     → rate_limit.rs + store.rs (fixed-window accounting, 429 on excess)
//!     → [handler]
//!     → cors.rs (merge CORS headers into the response)
//!
//! Webhook routes additionally:
//!     → webhook.rs (timestamp window + HMAC-SHA256 over the raw body)
//! ```
//!
//! # Design Decisions
//! - The gate never fails open or closed on internal errors: storage is
//!   in-memory and infallible
//! - Secrets are compared in constant time (compare.rs)
//! - Webhook failure causes are distinct internally, uniform on the wire

pub mod client_ip;
pub mod compare;
pub mod cors;
pub mod gate;
pub mod rate_limit;
pub mod store;
pub mod webhook;

pub use gate::{gate_middleware, RequestGate};
pub use rate_limit::{Admission, RateLimitExceeded, RateLimitStatus, RateLimiter};
pub use store::{InMemoryStore, RateLimitEntry, RateLimitStore};
pub use webhook::{sign, WebhookAuthError, WebhookAuthenticator};
