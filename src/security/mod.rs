//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS policy from the configured allow-lists)
//!     → rate_limit.rs (fixed-window check per client key)
//!     → Pass to the pipeline gates
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected check never reaches the backend
//! - Rate-limit state is the only shared mutable state in the process

pub mod headers;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
