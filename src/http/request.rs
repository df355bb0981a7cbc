//! Outbound request descriptors.
//!
//! # Responsibilities
//! - Describe one outbound call (method, URL, headers, query, body, expected status)
//! - Capture one-shot bodies into a re-readable buffer before the first attempt
//! - Produce an independent, rewound copy of the request for every attempt
//!
//! # Design Decisions
//! - The buffered body is `Bytes`: each attempt gets a cheap clone that starts at offset 0
//! - A dispatch id is assigned lazily so callers may supply their own
//! - Query pairs extend whatever query string the URL already carries

use std::fmt;
use std::time::Duration;

use axum::http::{header::HeaderName, HeaderMap, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use rand::{distributions::Alphanumeric, Rng};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::resilience::DispatchError;
use crate::validators;

const DISPATCH_ID_LEN: usize = 10;

/// Generate a short random id used to correlate the log lines of one dispatch.
pub fn dispatch_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DISPATCH_ID_LEN)
        .map(char::from)
        .collect()
}

/// Body of an outbound request.
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    /// A source that can only be read once. Buffered on first use.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl RequestBody {
    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        RequestBody::Reader(Box::new(reader))
    }

    /// Read the body into memory, replacing a one-shot reader with its buffered content.
    pub async fn buffer(&mut self) -> std::io::Result<Bytes> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Bytes(bytes) => Ok(bytes.clone()),
            RequestBody::Reader(reader) => {
                let mut content = Vec::new();
                reader.read_to_end(&mut content).await?;
                let content = Bytes::from(content);
                *self = RequestBody::Bytes(content.clone());
                Ok(content)
            }
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes.into())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Bytes(text.into())
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        RequestBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

/// Everything needed to send, and re-send, one outbound request.
#[derive(Debug)]
pub struct RequestDescriptor {
    pub id: Option<String>,
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub expected_status: StatusCode,
    pub cancel: CancellationToken,
    /// Per-request timeout; falls back to the transport's own.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// A GET request to `url` that expects `200 OK`.
    pub fn new(url: Url) -> Self {
        Self {
            id: None,
            method: Method::GET,
            url,
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
            query: Vec::new(),
            expected_status: StatusCode::OK,
            cancel: CancellationToken::new(),
            timeout: None,
        }
    }

    /// Validate and parse `url`, then build a default descriptor.
    pub fn parse(url: &str) -> Result<Self, DispatchError> {
        validators::validate_url(url).map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
        let url = Url::parse(url).map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
        Ok(Self::new(url))
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header; repeated names are all sent.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, DispatchError> {
        let name = HeaderName::try_from(name)
            .map_err(|e| DispatchError::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| DispatchError::InvalidRequest(format!("header value for {name}: {e}")))?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn expect(mut self, status: StatusCode) -> Self {
        self.expected_status = status;
        self
    }

    /// Tie the dispatch to an external cancellation token.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The dispatch id, generated on first use.
    pub fn ensure_id(&mut self) -> &str {
        self.id.get_or_insert_with(dispatch_id)
    }

    /// Build the request for the next attempt from the buffered body.
    pub async fn prepare(&mut self) -> Result<OutboundRequest, DispatchError> {
        let body = self.body.buffer().await.map_err(DispatchError::Body)?;

        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(OutboundRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body,
            timeout: self.timeout,
        })
    }
}

/// A single attempt, ready for the transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::parse("http://example.com/api?v=1").unwrap()
    }

    #[test]
    fn test_defaults() {
        let d = descriptor();
        assert_eq!(d.method, Method::GET);
        assert_eq!(d.expected_status, StatusCode::OK);
        assert!(d.id.is_none());
        assert!(!d.cancel.is_cancelled());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            RequestDescriptor::parse("example.com"),
            Err(DispatchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_ids_are_stable_once_assigned() {
        let mut d = descriptor();
        let first = d.ensure_id().to_string();
        assert_eq!(first.len(), DISPATCH_ID_LEN);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(d.ensure_id(), first);

        let mut named = descriptor().with_id("fixed");
        assert_eq!(named.ensure_id(), "fixed");
    }

    #[test]
    fn test_header_validation() {
        let d = descriptor()
            .header("x-trace", "a")
            .unwrap()
            .header("x-trace", "b")
            .unwrap();
        assert_eq!(d.headers.get_all("x-trace").iter().count(), 2);
        assert!(descriptor().header("bad header", "x").is_err());
        assert!(descriptor().header("x-ok", "line\nbreak").is_err());
    }

    #[tokio::test]
    async fn test_prepare_appends_query() {
        let mut d = descriptor().query("page", "2").query("q", "a b");
        let request = d.prepare().await.unwrap();
        assert_eq!(request.url.as_str(), "http://example.com/api?v=1&page=2&q=a+b");

        let mut plain = descriptor();
        assert_eq!(plain.prepare().await.unwrap().url.query(), Some("v=1"));
    }

    #[tokio::test]
    async fn test_reader_body_is_buffered_once() {
        let mut d = descriptor()
            .method(Method::POST)
            .body(RequestBody::reader(Cursor::new(b"payload".to_vec())));

        let first = d.prepare().await.unwrap();
        let second = d.prepare().await.unwrap();
        assert_eq!(first.body, Bytes::from_static(b"payload"));
        assert_eq!(second.body, first.body);
        assert!(matches!(d.body, RequestBody::Bytes(_)));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let mut d = descriptor();
        assert!(d.prepare().await.unwrap().body.is_empty());
    }
}
