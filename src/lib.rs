//! courier: resilient outbound HTTP dispatch and authenticated inbound routing.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod validators;

pub use config::CourierConfig;
pub use http::{HandlerSet, HttpServer, RequestDescriptor};
pub use lifecycle::shutdown::Shutdown;
pub use resilience::{DispatchError, DispatchHandle, Dispatcher, RetryPolicy};
pub use routing::{Route, RouteMethod, RouteTable};
pub use security::{Application, Applications, Gate};
