//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (scan same-method routes)
//!     → matcher.rs (score each pattern by matching prefix length)
//!     → Return: longest-matching Route or RouteError::NotFound
//!
//! Route Table (at startup):
//!     RouteConfig[]
//!     → Parse patterns into segments
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always resolves to the same route

pub mod matcher;
pub mod router;

pub use matcher::{matching_prefix_len, PathPattern, Segment};
pub use router::{Route, RouteError, RouteMethod, RouteTable};
