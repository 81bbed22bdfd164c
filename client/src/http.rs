//! reqwest-backed transport.

use crate::transport::{Response, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

/// [`Transport`] over a shared reqwest client.
///
/// Paths are joined onto the base URL; the body of a non-2xx response is
/// carried in the error message.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build on an existing reqwest client, e.g. one carrying default
    /// headers or auth middleware.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> TransportResult {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), body));
        }

        let data = if body.trim().is_empty() {
            None
        } else {
            let value = serde_json::from_str::<Value>(&body).map_err(|e| TransportError {
                status: Some(status.as_u16()),
                message: format!("invalid JSON body: {e}"),
            })?;
            Some(value)
        };
        Ok(Response::new(status.as_u16(), data))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> TransportResult {
        let url = self.url(path);
        trace!(%url, "GET");
        self.execute(self.client.get(&url).query(query)).await
    }

    async fn post(&self, path: &str, body: &Value) -> TransportResult {
        let url = self.url(path);
        trace!(%url, "POST");
        self.execute(self.client.post(&url).json(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> TransportResult {
        let url = self.url(path);
        trace!(%url, "PATCH");
        self.execute(self.client.patch(&url).json(body)).await
    }

    async fn delete(&self, path: &str, body: Option<&Value>) -> TransportResult {
        let url = self.url(path);
        trace!(%url, "DELETE");
        let mut request = self.client.delete(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }
}
