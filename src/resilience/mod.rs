//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     RequestDescriptor
//!     → retries.rs (spawn dispatch task, loop over attempts)
//!     → transport.rs (send one prepared request)
//!     → timeouts.rs (connect/request deadlines of the shared client)
//!     → On failure: backoff.rs (staircase delay, attempt ceiling)
//!     → DispatchHandle resolves with exactly one outcome
//! ```
//!
//! # Design Decisions
//! - Transport failures and unexpected status codes are both retried
//! - Retry state is private to one dispatch; nothing is shared across dispatches
//! - Pending retries live in memory only

pub mod backoff;
pub mod retries;
pub mod timeouts;
pub mod transport;

use axum::http::StatusCode;
use thiserror::Error;

pub use backoff::{RetryPolicy, RetryState};
pub use retries::{DispatchHandle, Dispatcher};
pub use timeouts::{build_client, TransportConfig};
pub use transport::{Transport, TransportError};

/// Failures of an outbound dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("reading request body: {0}")]
    Body(#[source] std::io::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected status {actual} (expected {expected})")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
    },

    #[error("request failed after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<DispatchError>,
    },

    #[error("request cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("dispatch ended without delivering a result")]
    Abandoned,
}

impl DispatchError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Transport(_) | DispatchError::UnexpectedStatus { .. }
        )
    }
}
