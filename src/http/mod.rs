//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound:
//!     TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security gate (route resolution + Basic auth)
//!     → handlers.rs (bound by route name)
//!     → response.rs (JSON / JSONP writers, not-found mapping via not_found.rs)
//!
//! Outbound:
//!     request.rs (RequestDescriptor → OutboundRequest per attempt)
//!     → resilience dispatcher
//! ```

pub mod handlers;
pub mod not_found;
pub mod request;
pub mod response;
pub mod server;

pub use not_found::{NotFoundRegistry, ResourceNotFound};
pub use request::{OutboundRequest, RequestBody, RequestDescriptor};
pub use response::{render_json, render_jsonp, write_json};
pub use server::{HandlerSet, HttpServer, ServerError};
