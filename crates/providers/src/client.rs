//! HTTP client for the text-generation providers.

use std::time::Duration;

use async_trait::async_trait;
use quickform_core::provider::{ProviderConfig, ProviderKind};

use crate::error::ProviderError;
use crate::payload;

/// Time allowed to establish a connection before a call fails fast.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A synchronous-looking, potentially slow call to a text-generation service.
///
/// Implementations must be cancel-safe: the engine drops the future when
/// the caller's deadline passes.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str, config: &ProviderConfig)
        -> Result<String, ProviderError>;
}

/// [`ModelClient`] that calls the real provider endpoints with [`reqwest`].
pub struct HttpModelClient {
    client: reqwest::Client,
    base_url_override: Option<String>,
}

impl HttpModelClient {
    /// Create a client with a fresh connection pool.
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url_override: None,
        }
    }

    /// Send every request to `url` instead of the provider's public endpoint.
    ///
    /// Used to point the engine at a local gateway or mock server.
    pub fn with_endpoint_override(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    fn url_for(&self, kind: ProviderKind) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| payload::endpoint(kind))
    }

    /// Return the response unchanged on 2xx, otherwise an
    /// [`ProviderError::ApiError`] with the status and a body snippet.
    async fn ensure_success(
        kind: ProviderKind,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            return Err(ProviderError::ApiError {
                provider: kind.as_str(),
                status: status.as_u16(),
                body: payload::snippet(&body),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, ProviderError> {
        let kind = config.kind;
        tracing::info!(
            provider = %kind,
            prompt_chars = prompt.chars().count(),
            "Calling model provider",
        );

        let response = self
            .client
            .post(self.url_for(kind))
            .bearer_auth(&config.api_key)
            .json(&payload::request_body(kind, prompt))
            .send()
            .await?;

        let response = Self::ensure_success(kind, response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(ProviderError::UnexpectedResponse {
                provider: kind.as_str(),
                snippet: "<empty body>".to_string(),
            });
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| ProviderError::UnexpectedResponse {
                provider: kind.as_str(),
                snippet: payload::snippet(&text),
            })?;

        let reply = payload::parse_response(kind, &body)?;
        tracing::info!(
            provider = %kind,
            reply_chars = reply.chars().count(),
            "Model provider responded",
        );
        Ok(reply)
    }
}
