//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (WEBHOOK_SECRET, ALLOWED_ORIGINS, ...)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! diagnostics.rs reads the same GateConfig for the production
//! readiness endpoint.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod diagnostics;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, load_config, read_config, ConfigError};
pub use schema::{
    AdminConfig, CorsConfig, CvConfig, EndpointClass, GateConfig, ListenerConfig,
    ObservabilityConfig, RateLimitConfig, RateLimitRule, WebhookConfig,
};
pub use validation::{validate_config, ValidationReport};
