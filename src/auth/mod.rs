//! Authentication and authorization.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → validator.rs (extract token from cookie or Authorization header,
//!                     verify signature + expiry, produce TokenClaims)
//!     → guard.rs (match claims.role against the route's allowed roles)
//! ```
//!
//! # Design Decisions
//! - Cookie takes precedence over the Authorization header
//! - Algorithm is pinned to HS256; a token declaring anything else is
//!   rejected before signature verification
//! - Verification failures are generic on the wire, specific in the log

pub mod guard;
pub mod validator;

pub use guard::authorize;
pub use validator::{extract_token, validate, TokenClaims, ACCESS_TOKEN_COOKIE};
