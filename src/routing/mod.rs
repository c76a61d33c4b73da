//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (scan table in declaration order)
//!     → matcher.rs (segment-by-segment pattern match)
//!     → Return: matched RouteDescriptor or explicit no-match
//!
//! Table Construction (at startup):
//!     ServiceUrls
//!     → RouteTable::standard (full production table)
//!     → Freeze as immutable RouteTable, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Table is immutable after startup; unsynchronized concurrent reads
//! - No regex in the hot path; `:param` segments only
//! - First match wins, so exact paths are declared before parameterized ones
//! - Tests swap in a hand-built table instead of the standard one

pub mod matcher;
pub mod router;

pub use matcher::PathPattern;
pub use router::{RouteDescriptor, RouteTable};
