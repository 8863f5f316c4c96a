//! Admin surface: bearer-token guard and operator endpoints.
//!
//! Routes are mounted by the HTTP server behind their request gate; the
//! guard runs after admission so rejected tokens still count against quota.

pub mod auth;
pub mod handlers;

pub use auth::{admin_auth_middleware, bearer_token};
