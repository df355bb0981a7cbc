//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (OPTIONS bypass, resolve route, public/private split)
//!     → basic_auth.rs (parse Basic credentials, verify key)
//!       or bearer.rs (header / access_token query, JWT verification)
//!     → applications.rs (look up the calling application)
//!     → Pass to handler with RequesterApp attached
//! ```
//!
//! # Design Decisions
//! - Fail closed: any credential problem denies the request
//! - Denials are never retried; they map straight to a 4xx response

pub mod applications;
pub mod basic_auth;
pub mod bearer;
pub mod gate;

use axum::http::StatusCode;
use thiserror::Error;

pub use applications::{Application, Applications};
pub use basic_auth::authenticate;
pub use bearer::{access_token, parse_from_request};
pub use gate::{authentication_middleware, Decision, Gate, GateError, MatchedRoute, RequesterApp};

/// Credential failures on private routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Unsupported authentication scheme")]
    UnsupportedAuthScheme,

    #[error("Wrong authentication token")]
    WrongAuthToken,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("No token present in request")]
    NoTokenInRequest,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UnsupportedAuthScheme | AuthError::WrongAuthToken => StatusCode::BAD_REQUEST,
            AuthError::ApplicationNotFound | AuthError::AuthFailed | AuthError::NoTokenInRequest => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}
