use super::{HttpRequest, Method, RawResponse, Transport, TransportError};
use crate::{BoxStream, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// reqwest-backed [`Transport`].
///
/// Settings are read from the environment when built with
/// [`HttpTransport::from_env`]:
/// `COURIER_HTTP_TIMEOUT_SECS` (30), `COURIER_HTTP_POOL_MAX_IDLE_PER_HOST` (32),
/// `COURIER_HTTP_POOL_IDLE_TIMEOUT_SECS` (90) and `COURIER_PROXY_URL`.
///
/// The timeout bounds connecting and every buffered request as a whole. For
/// [`Transport::send_stream`] it bounds only the wait for the response
/// headers; the body may take as long as the generation does.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn from_env() -> Result<Self> {
        let timeout = Duration::from_secs(env_parse("COURIER_HTTP_TIMEOUT_SECS").unwrap_or(30));

        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeout)
            .pool_max_idle_per_host(env_parse("COURIER_HTTP_POOL_MAX_IDLE_PER_HOST").unwrap_or(32))
            .pool_idle_timeout(Some(Duration::from_secs(
                env_parse("COURIER_HTTP_POOL_IDLE_TIMEOUT_SECS").unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("COURIER_PROXY_URL") {
            match Proxy::all(&proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(proxy_url, error = %e, "ignoring invalid proxy url"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }

    /// Wrap an already configured reqwest client. No timeout is added.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn dispatch(&self, request: &HttpRequest, whole_body: bool) -> Result<reqwest::Response> {
        let mut req = match request.method {
            Method::Post => self.client.post(&request.url),
            Method::Get => self.client.get(&request.url),
        };
        if let (true, Some(timeout)) = (whole_body, self.timeout) {
            req = req.timeout(timeout);
        }
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let response = self.dispatch(request, true).await?;
        let text = response.text().await.map_err(TransportError::Http)?;
        if text.trim().is_empty() {
            return Ok(RawResponse::Json(serde_json::Value::Null));
        }
        Ok(match serde_json::from_str(&text) {
            Ok(json) => RawResponse::Json(json),
            Err(_) => RawResponse::Text(text),
        })
    }

    async fn send_stream(&self, request: &HttpRequest) -> Result<BoxStream<'static, Bytes>> {
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.dispatch(request, false))
                .await
                .map_err(|_| TransportError::Timeout(timeout))??,
            None => self.dispatch(request, false).await?,
        };
        let byte_stream = response
            .bytes_stream()
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse::<T>().ok())
}
