//! Resilient request dispatch.
//!
//! # Responsibilities
//! - Send one outbound request and check its status code
//! - Retry failed attempts with staircase backoff up to a ceiling
//! - Stop promptly when the dispatch is cancelled or its handle is dropped
//! - Deliver exactly one terminal outcome per dispatch
//!
//! # Design Decisions
//! - One Tokio task per dispatch; attempts within a dispatch are sequential
//! - The backoff sleep races the cancellation token, so cancelling never waits out a delay
//! - A cancellation during an in-flight attempt takes effect at the next check;
//!   a success from that attempt is still delivered
//! - Request construction errors are not retried

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::http::request::RequestDescriptor;
use crate::observability::metrics;
use crate::resilience::backoff::{RetryPolicy, RetryState};
use crate::resilience::timeouts::{build_client, TransportConfig};
use crate::resilience::transport::Transport;
use crate::resilience::DispatchError;

/// Sends outbound requests over a shared transport.
#[derive(Debug)]
pub struct Dispatcher<T = reqwest::Client> {
    transport: Arc<T>,
    policy: RetryPolicy,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl Dispatcher<reqwest::Client> {
    /// Build a dispatcher backed by a `reqwest` client configured from `config`.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, DispatchError> {
        let client = build_client(&TransportConfig::from(config))?;
        Ok(Self::new(client, RetryPolicy::from(config)))
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport: Arc::new(transport),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the request once.
    ///
    /// A response whose status differs from the expected one is reported as
    /// [`DispatchError::UnexpectedStatus`].
    pub async fn send(&self, descriptor: &mut RequestDescriptor) -> Result<T::Response, DispatchError> {
        send_once(self.transport.as_ref(), descriptor).await
    }

    /// Send the request in a background task, retrying until it succeeds,
    /// the attempt ceiling is reached, or the dispatch is cancelled.
    pub fn dispatch(&self, mut descriptor: RequestDescriptor) -> DispatchHandle<T::Response> {
        let id = descriptor.ensure_id().to_string();
        let cancel = descriptor.cancel.clone();
        let (mut result_tx, result_rx) = oneshot::channel();
        let transport = self.transport.clone();
        let policy = self.policy.clone();

        tokio::spawn(async move {
            let outcome =
                run_with_retry(transport.as_ref(), &policy, &mut descriptor, &mut result_tx).await;
            metrics::record_dispatch_outcome(outcome_label(&outcome));

            if result_tx.send(outcome).is_err() {
                tracing::debug!(dispatch_id = ?descriptor.id, "Dispatch handle dropped before delivery");
            }
        });

        DispatchHandle {
            id,
            cancel,
            result: result_rx,
        }
    }
}

fn outcome_label<R>(outcome: &Result<R, DispatchError>) -> &'static str {
    match outcome {
        Ok(_) => "success",
        Err(DispatchError::Cancelled { .. }) => "cancelled",
        Err(DispatchError::RetryExhausted { .. }) => "exhausted",
        Err(_) => "failed",
    }
}

async fn send_once<T: Transport>(
    transport: &T,
    descriptor: &mut RequestDescriptor,
) -> Result<T::Response, DispatchError> {
    let id = descriptor.ensure_id().to_string();
    let expected = descriptor.expected_status;
    let request = descriptor.prepare().await?;

    tracing::info!(
        dispatch_id = %id,
        method = %request.method,
        url = %request.url,
        "Sending HTTP request"
    );

    match transport.execute(request).await {
        Ok(response) => {
            let status = T::status(&response);
            if status == expected {
                metrics::record_dispatch_attempt("success");
                tracing::info!(dispatch_id = %id, status = %status, "Request was successful");
                Ok(response)
            } else {
                metrics::record_dispatch_attempt("unexpected_status");
                tracing::warn!(
                    dispatch_id = %id,
                    status = %status,
                    expected = %expected,
                    "Request was unsuccessful"
                );
                Err(DispatchError::UnexpectedStatus {
                    expected,
                    actual: status,
                })
            }
        }
        Err(e) => {
            metrics::record_dispatch_attempt("transport_error");
            tracing::warn!(dispatch_id = %id, error = %e, "Request was unsuccessful");
            Err(DispatchError::Transport(e))
        }
    }
}

async fn run_with_retry<T: Transport>(
    transport: &T,
    policy: &RetryPolicy,
    descriptor: &mut RequestDescriptor,
    result_tx: &mut oneshot::Sender<Result<T::Response, DispatchError>>,
) -> Result<T::Response, DispatchError> {
    let cancel: CancellationToken = descriptor.cancel.clone();
    let id = descriptor.ensure_id().to_string();
    let mut state = RetryState::new(policy);

    loop {
        if cancel.is_cancelled() || result_tx.is_closed() {
            tracing::warn!(dispatch_id = %id, attempts = state.attempts(), "Request cancelled");
            return Err(DispatchError::Cancelled {
                attempts: state.attempts(),
            });
        }

        let attempt = state.begin_attempt();
        let failure = match send_once(transport, descriptor).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        let Some(delay) = state.on_failure() else {
            tracing::warn!(dispatch_id = %id, attempts = attempt, "Request failed. Stop retrying.");
            return Err(DispatchError::RetryExhausted {
                attempts: attempt,
                last: Box::new(failure),
            });
        };

        tracing::warn!(
            dispatch_id = %id,
            attempt,
            delay = ?delay,
            "Request failed, retrying"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(dispatch_id = %id, attempts = attempt, "Request cancelled during backoff");
                return Err(DispatchError::Cancelled { attempts: attempt });
            }
            _ = result_tx.closed() => {
                tracing::debug!(dispatch_id = %id, attempts = attempt, "Dispatch handle dropped, giving up");
                return Err(DispatchError::Cancelled { attempts: attempt });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// The caller's side of a running dispatch.
///
/// Awaiting the handle yields the single terminal outcome. Dropping it stops
/// the dispatch at its next suspension point.
#[derive(Debug)]
pub struct DispatchHandle<R> {
    id: String,
    cancel: CancellationToken,
    result: oneshot::Receiver<Result<R, DispatchError>>,
}

impl<R> DispatchHandle<R> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ask the dispatch to stop; pending retries are abandoned.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<R> Future for DispatchHandle<R> {
    type Output = Result<R, DispatchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().result)
            .poll(cx)
            .map(|delivered| delivered.unwrap_or(Err(DispatchError::Abandoned)))
    }
}
