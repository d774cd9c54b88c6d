//! Error types for the Kuaidi100 SDK.

/// Result type for SDK operations.
pub type Kuaidi100Result<T> = Result<T, Kuaidi100Error>;

/// Error types that can occur when calling the Kuaidi100 API.
#[derive(Debug, thiserror::Error)]
pub enum Kuaidi100Error {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request was sent but no response came back (timeout, refused
    /// connection, dropped body).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Server error (status {status}): {body}")]
    Server { status: u16, body: String },

    /// Something went wrong before the request could be sent.
    #[error("Request setup error: {0}")]
    RequestSetup(String),

    /// Anything that is not an HTTP-layer failure.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl Kuaidi100Error {
    /// Stable label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::RequestSetup(_) => "request_setup",
            Self::Unknown(_) => "unknown",
        }
    }

    /// HTTP status of a server error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Sort a reqwest failure into the adapter's error taxonomy.
    pub fn classify(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::RequestSetup(err.to_string())
        } else if err.is_timeout()
            || err.is_connect()
            || err.is_request()
            || err.is_body()
            || err.is_decode()
        {
            Self::Transport(err)
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl From<url::ParseError> for Kuaidi100Error {
    fn from(err: url::ParseError) -> Self {
        Self::RequestSetup(format!("invalid URL: {}", err))
    }
}
