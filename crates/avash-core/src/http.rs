//! JSON-over-HTTP transport capability.
//!
//! The weather pipeline only ever needs "GET a URL, give me the JSON body".
//! `JsonTransport` is that seam; `HttpTransport` is the reqwest-backed
//! implementation used by the application.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{NetworkError, ReqwestErrorExt};

const USER_AGENT: &str = concat!("Avash/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in `NetworkError::ServerError`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Fetch a JSON document from a URL.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, NetworkError>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, NetworkError> {
        // Query strings carry the API key, so only the path is logged.
        tracing::debug!("GET {}", url.path());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::debug!("{} returned status {}", url.path(), status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}
