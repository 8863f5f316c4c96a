//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → request.rs (request ID)
//!     → [per-class request gate] (crate::security)
//!     → handler (crate::api, crate::admin)
//!     → response.rs (error bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};
