//! Transport capability consumed by the client.
//!
//! The core never talks to the network directly: it builds an [`HttpRequest`]
//! and hands it to a [`Transport`]. [`HttpTransport`] is the production
//! implementation; tests can plug in anything that implements the trait.

pub mod credentials;
pub mod http;

pub use credentials::Credentials;
pub use http::HttpTransport;

use crate::{BoxStream, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// HTTP method used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully built outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response body as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that was not JSON (for example a buffered event stream).
    Text(String),
}

impl RawResponse {
    /// True for an empty body, `null`, or an empty JSON object.
    pub fn is_empty(&self) -> bool {
        match self {
            RawResponse::Json(Value::Null) => true,
            RawResponse::Json(Value::Object(map)) => map.is_empty(),
            RawResponse::Json(_) => false,
            RawResponse::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            RawResponse::Json(v) => Some(v),
            RawResponse::Text(_) => None,
        }
    }
}

/// The send capability.
///
/// Implementations own timeouts, proxies and connection pooling; the core
/// performs no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and buffer the whole response body.
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse>;

    /// Send a request and return the response body as a byte stream.
    async fn send_stream(&self, request: &HttpRequest) -> Result<BoxStream<'static, Bytes>>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No response within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Transport error: {0}")]
    Other(String),
}
