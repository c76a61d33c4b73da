//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, /health bypass)
//!     → request.rs (request ID as early as possible)
//!     → [pipeline gates decide admit/reject]
//!     → forward.rs (replay against the backend, stream response back)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::Forwarder;
pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
