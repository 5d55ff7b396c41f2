use crate::error::{Error, ErrorContext};
use crate::transport::{Credentials, HttpRequest, HttpTransport, RawResponse, Transport};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Client for one Courier deployment.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct CourierClient {
    pub(crate) credentials: Credentials,
    pub(crate) transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for CourierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl CourierClient {
    pub fn builder() -> CourierClientBuilder {
        CourierClientBuilder::new()
    }

    /// Client configured entirely from `COURIER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        CourierClientBuilder::new().build()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Send a request and return the buffered body.
    pub(crate) async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        info!(method = %request.method, url = %request.url, "sending request");
        self.transport.send(request).await
    }

    /// Send a request whose answer must be JSON.
    pub(crate) async fn send_json(&self, request: &HttpRequest) -> Result<serde_json::Value> {
        match self.send(request).await? {
            RawResponse::Json(v) => Ok(v),
            RawResponse::Text(body) => Err(Error::invalid_input_with_context(
                "Expected a JSON response",
                ErrorContext::new()
                    .with_source(request.url.clone())
                    .with_details(truncate(&body, 200)),
            )),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Builder for [`CourierClient`].
///
/// Anything not set explicitly falls back to the environment: credentials
/// from `COURIER_BASE_URL`/`COURIER_API_KEY`, transport settings from the
/// `COURIER_HTTP_*` variables.
#[derive(Default)]
pub struct CourierClientBuilder {
    credentials: Option<Credentials>,
    transport: Option<Arc<dyn Transport>>,
}

impl CourierClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use a custom transport (tests, proxies, recording).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<CourierClient> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::from_env()?),
        };
        Ok(CourierClient {
            credentials,
            transport,
        })
    }
}
