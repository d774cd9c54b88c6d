//! Main client for the Kuaidi100 SDK.

use crate::api::{EstimateApi, TraceApi};
use crate::config::{parse_base_url, ApiKey, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{Kuaidi100Error, Kuaidi100Result};
use crate::payload::RequestPayload;
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;

/// Main client for interacting with the Kuaidi100 API.
#[derive(Debug, Clone)]
pub struct Kuaidi100Client {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl Kuaidi100Client {
    /// Create a new client builder.
    pub fn builder() -> Kuaidi100ClientBuilder {
        Kuaidi100ClientBuilder::new()
    }

    /// Create a client from `KUAIDI100_API_KEY`.
    pub fn from_env() -> Kuaidi100Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> Kuaidi100Result<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the trace API.
    pub fn trace(&self) -> TraceApi<'_> {
        TraceApi::new(self)
    }

    /// Get the estimation API.
    pub fn estimate(&self) -> EstimateApi<'_> {
        EstimateApi::new(self)
    }

    /// POST a payload to its endpoint with the credential injected and
    /// return the raw response body.
    pub async fn execute(&self, payload: impl Into<RequestPayload>) -> Kuaidi100Result<String> {
        self.http.post_payload(&payload.into()).await
    }
}

/// Builder for creating a Kuaidi100Client.
pub struct Kuaidi100ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl Kuaidi100ClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Kuaidi100Result<Kuaidi100Client> {
        let api_key = self
            .api_key
            .ok_or_else(|| Kuaidi100Error::Config("api_key is required".to_string()))?;

        let config = ClientConfig {
            base_url: parse_base_url(&self.base_url)?,
            api_key: ApiKey::new(api_key)?,
            timeout: self.timeout,
        };

        Kuaidi100Client::from_config(config)
    }
}

impl Default for Kuaidi100ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
