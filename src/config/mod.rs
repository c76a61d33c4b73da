//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read variables, apply documented defaults, parse)
//!     → validation.rs (semantic checks, collected not first-only)
//!     → GatewayConfig (validated, immutable)
//!     → plain values handed to each subsystem
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; components never read the
//!   environment themselves
//! - Validation separates syntactic (parsing) from semantic checks
//! - The route-table invariant (roles imply auth) is a startup error

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, ObservabilityConfig, RateLimitConfig, ServiceUrls, TimeoutConfig,
};
pub use validation::{validate_config, validate_table, ValidationError};
