//! HTTP transport layer for the Kuaidi100 SDK.
//!
//! One outbound exchange per call: no retries, multipart form bodies, the
//! configured timeout, and a log record for the request, the response, and
//! every failure.

use crate::config::ClientConfig;
use crate::error::{Kuaidi100Error, Kuaidi100Result};
use crate::payload::RequestPayload;
use reqwest::{multipart, Client, Method};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

/// Text fields of a multipart form body.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<FormField>,
}

#[derive(Clone, PartialEq, Eq)]
struct FormField {
    name: String,
    value: String,
    secret: bool,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: value.into(),
            secret: false,
        });
        self
    }

    /// Add a field whose value is masked in `Debug` output.
    pub fn secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: value.into(),
            secret: true,
        });
        self
    }

    /// Value of the first field with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn to_multipart(&self) -> multipart::Form {
        self.fields.iter().fold(multipart::Form::new(), |form, field| {
            form.text(field.name.clone(), field.value.clone())
        })
    }
}

impl fmt::Debug for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for field in &self.fields {
            if field.secret {
                map.entry(&field.name, &"****");
            } else {
                map.entry(&field.name, &field.value);
            }
        }
        map.finish()
    }
}

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> Kuaidi100Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Kuaidi100Error::RequestSetup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the URL for an endpoint suffix under the configured base URL.
    pub fn endpoint_url(&self, suffix: &str) -> Kuaidi100Result<Url> {
        self.config.base_url.join(suffix).map_err(|e| {
            let err = Kuaidi100Error::from(e);
            log_failure(&self.config.base_url, &err);
            err
        })
    }

    /// POST a payload to its endpoint with the credential injected.
    ///
    /// URL and form building failures are logged the same way as a failed
    /// exchange.
    pub async fn post_payload(&self, payload: &RequestPayload) -> Kuaidi100Result<String> {
        let url = self.endpoint_url(payload.endpoint())?;
        let form = payload.to_form(&self.config.api_key).map_err(|err| {
            log_failure(&url, &err);
            err
        })?;

        self.request(Method::POST, url, Some(&form), None).await
    }

    /// Perform one request and return the response body verbatim.
    ///
    /// `body` is sent as `multipart/form-data`; `query` is appended to the
    /// URL. Non-2xx responses become [`Kuaidi100Error::Server`].
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&FormBody>,
        query: Option<&[(&str, &str)]>,
    ) -> Kuaidi100Result<String> {
        if let Some(body) = body {
            info!(method = %method, url = %url, body = ?body, "Sending request");
        }
        if let Some(params) = query {
            info!(method = %method, url = %url, params = ?params, "Sending request");
        }
        if body.is_none() && query.is_none() {
            info!(method = %method, url = %url, "Sending request");
        }

        match self.exchange(method, &url, body, query).await {
            Ok(text) => {
                info!(url = %url, response = %text, "Response received");
                Ok(text)
            }
            Err(err) => {
                log_failure(&url, &err);
                Err(err)
            }
        }
    }

    /// Perform one request and decode the body as JSON.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&FormBody>,
        query: Option<&[(&str, &str)]>,
    ) -> Kuaidi100Result<T> {
        let text = self.request(method, url.clone(), body, query).await?;
        serde_json::from_str(&text).map_err(|e| {
            let err = Kuaidi100Error::Unknown(format!("failed to decode response: {}", e));
            log_failure(&url, &err);
            err
        })
    }

    async fn exchange(
        &self,
        method: Method,
        url: &Url,
        body: Option<&FormBody>,
        query: Option<&[(&str, &str)]>,
    ) -> Kuaidi100Result<String> {
        let mut builder = self.client.request(method, url.clone());
        if let Some(params) = query {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.multipart(body.to_multipart());
        }

        let response = builder.send().await.map_err(Kuaidi100Error::classify)?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Response status");

        let text = response.text().await.map_err(Kuaidi100Error::classify)?;
        if !status.is_success() {
            return Err(Kuaidi100Error::Server {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

fn log_failure(url: &Url, err: &Kuaidi100Error) {
    match err {
        Kuaidi100Error::Server { status, body } => error!(
            url = %url,
            kind = err.kind(),
            status = *status,
            body = %body,
            "Server responded with error status"
        ),
        Kuaidi100Error::Transport(source) => error!(
            url = %url,
            kind = err.kind(),
            error = %source,
            "Request sent but no response received"
        ),
        Kuaidi100Error::RequestSetup(message) => error!(
            url = %url,
            kind = err.kind(),
            error = %message,
            "Error setting up request"
        ),
        Kuaidi100Error::Config(message) | Kuaidi100Error::Unknown(message) => error!(
            url = %url,
            kind = err.kind(),
            error = %message,
            "Unexpected error"
        ),
    }
}
