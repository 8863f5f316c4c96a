//! Public API handlers.
//!
//! Each handler sits behind the request gate of its endpoint class, so it
//! only ever sees admitted, non-preflight requests.

pub mod cv;
pub mod health;
pub mod webhook;
