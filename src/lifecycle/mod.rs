//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     broadcast to server + background tasks → stop accepting → drain
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
