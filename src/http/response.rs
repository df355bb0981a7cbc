//! JSON response writers.
//!
//! # Responsibilities
//! - Serialize handler results as JSON (or JSONP) with the requested status
//! - Map errors to a plain-text body with the error status
//! - Answer registered "not found" errors with 404 regardless of the error status
//!
//! # Design Decisions
//! - Serialization failures are reported as 500, never as a half-written body
//! - `Content-Length` is always set; bodies are fully buffered

use std::error::Error;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::http::not_found::NotFoundRegistry;

/// Render `result` as a JSON response.
///
/// `Ok` values are serialized with `status`; errors are written as text with
/// `error_status`, except not-found errors which always produce an empty 404.
pub fn render_json<T, E>(
    result: Result<T, E>,
    status: StatusCode,
    error_status: StatusCode,
    registry: &NotFoundRegistry,
) -> Response
where
    T: Serialize,
    E: Error + 'static,
{
    match result {
        Ok(data) => match serde_json::to_vec(&data) {
            Ok(bytes) => write_json(bytes, status),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
        Err(e) => render_error(&e, error_status, registry),
    }
}

/// Render `result` as `callback(<json>)` with a JavaScript content type.
pub fn render_jsonp<T, E>(
    callback: &str,
    result: Result<T, E>,
    status: StatusCode,
    error_status: StatusCode,
    registry: &NotFoundRegistry,
) -> Response
where
    T: Serialize,
    E: Error + 'static,
{
    match result {
        Ok(data) => match serde_json::to_string(&data) {
            Ok(json) => {
                let body = format!("{callback}({json})");
                (
                    status,
                    [(header::CONTENT_TYPE, "application/javascript")],
                    body,
                )
                    .into_response()
            }
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
        Err(e) => render_error(&e, error_status, registry),
    }
}

/// Write already-encoded JSON with the given status.
pub fn write_json(data: impl Into<Vec<u8>>, status: StatusCode) -> Response {
    let data = data.into();
    let length = data.len();
    let mut response = Response::new(Body::from(data));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn render_error(
    err: &(dyn Error + 'static),
    error_status: StatusCode,
    registry: &NotFoundRegistry,
) -> Response {
    if registry.is_not_found(err) {
        return StatusCode::NOT_FOUND.into_response();
    }
    (error_status, err.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::not_found::ResourceNotFound;
    use serde_json::json;
    use std::convert::Infallible;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("quota exceeded")]
    struct QuotaExceeded;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_success() {
        let registry = NotFoundRegistry::new();
        let response = render_json::<_, Infallible>(
            Ok(json!({"id": 7})),
            StatusCode::CREATED,
            StatusCode::BAD_REQUEST,
            &registry,
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "8");
        assert_eq!(body_string(response).await, r#"{"id":7}"#);
    }

    #[tokio::test]
    async fn test_json_error_uses_error_status() {
        let registry = NotFoundRegistry::new();
        let response = render_json::<(), _>(
            Err(QuotaExceeded),
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            &registry,
        );
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_string(response).await, "quota exceeded");
    }

    #[tokio::test]
    async fn test_not_found_overrides_error_status() {
        let registry = NotFoundRegistry::new();
        let response = render_json::<(), _>(
            Err(ResourceNotFound),
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            &registry,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.is_empty());

        registry.register::<QuotaExceeded>();
        let response = render_json::<(), _>(
            Err(QuotaExceeded),
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            &registry,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_jsonp() {
        let registry = NotFoundRegistry::new();
        let response = render_jsonp::<_, Infallible>(
            "handle",
            Ok(vec![1, 2]),
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            &registry,
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/javascript");
        assert_eq!(body_string(response).await, "handle([1,2])");
    }

    #[tokio::test]
    async fn test_write_json() {
        let response = write_json(b"[]".to_vec(), StatusCode::ACCEPTED);
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "2");
        assert_eq!(body_string(response).await, "[]");
    }
}
