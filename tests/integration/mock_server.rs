//! Mock HTTP server setup for integration tests

use courier_gateway::transport::{Credentials, HttpTransport};
use courier_gateway::CourierClient;
use mockito::{Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;

pub const API_KEY: &str = "test-key";

/// Test fixture that owns a mock server and a client pointed at it
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        // Trailing slash on purpose: endpoints must not end up with `//`.
        let base_url = format!("{}/", server.url());
        Self { server, base_url }
    }

    pub fn client(&self) -> CourierClient {
        CourierClient::builder()
            .credentials(Credentials::new(&self.base_url, API_KEY).expect("valid base url"))
            .transport(Arc::new(HttpTransport::with_client(reqwest::Client::new())))
            .build()
            .expect("client")
    }

    /// Client whose transport enforces `timeout`
    pub fn client_with_timeout(&self, timeout: Duration) -> CourierClient {
        let transport = HttpTransport::with_client(reqwest::Client::new()).with_timeout(timeout);
        CourierClient::builder()
            .credentials(Credentials::new(&self.base_url, API_KEY).expect("valid base url"))
            .transport(Arc::new(transport))
            .build()
            .expect("client")
    }

    /// Event-stream body from `data:` payloads, each followed by a blank line
    pub fn sse_body(chunks: &[&str]) -> String {
        chunks
            .iter()
            .map(|chunk| format!("data: {}\n\n", chunk))
            .collect()
    }
}
