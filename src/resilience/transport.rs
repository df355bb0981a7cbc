//! The seam between the dispatcher and the HTTP client.
//!
//! `reqwest::Client` is the production transport. It is cheap to clone and
//! safe to share between concurrent dispatches.

use std::future::Future;

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::request::OutboundRequest;

/// Failure to get any response from the peer.
#[derive(Debug, Error)]
#[error("transport failure: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Sends one prepared request and reports the response status.
pub trait Transport: Send + Sync + 'static {
    type Response: Send + 'static;

    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<Self::Response, TransportError>> + Send;

    fn status(response: &Self::Response) -> StatusCode;
}

impl Transport for reqwest::Client {
    type Response = reqwest::Response;

    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<Self::Response, TransportError>> + Send {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        async move { builder.send().await.map_err(TransportError::new) }
    }

    fn status(response: &Self::Response) -> StatusCode {
        response.status()
    }
}
