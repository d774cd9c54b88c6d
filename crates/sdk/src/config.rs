//! Configuration types for the Kuaidi100 SDK.

use crate::error::{Kuaidi100Error, Kuaidi100Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Base URL of the Kuaidi100 stdio API.
pub const DEFAULT_BASE_URL: &str = "https://api.kuaidi100.com/stdio/";

/// Timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "KUAIDI100_API_KEY";

/// The Kuaidi100 API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Kuaidi100Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Kuaidi100Error::Config("API key must not be empty".to_string()));
        }
        Ok(Self(key))
    }

    /// The raw key, for placing into outbound payloads.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Configuration for the Kuaidi100 client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint suffix is joined onto. Always ends with `/`.
    pub base_url: Url,
    /// Credential injected into every payload.
    pub api_key: ApiKey,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration against the public API with the default timeout.
    pub fn new(api_key: ApiKey) -> Kuaidi100Result<Self> {
        Ok(Self {
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read the API key from `KUAIDI100_API_KEY`.
    pub fn from_env() -> Kuaidi100Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`], with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Kuaidi100Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(API_KEY_ENV).ok_or_else(|| {
            Kuaidi100Error::Config(format!("{} environment variable is not set", API_KEY_ENV))
        })?;

        Self::new(ApiKey::new(key)?)
    }
}

/// Parse a base URL, appending the trailing slash `Url::join` needs to keep
/// the last path segment.
pub fn parse_base_url(raw: &str) -> Kuaidi100Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Kuaidi100Error::RequestSetup(format!(
            "base URL cannot carry endpoint paths: {}",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
