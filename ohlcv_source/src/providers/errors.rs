use thiserror::Error;

/// Errors that can occur during the creation of a client instance.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// Failed to build the underlying HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The configured base URL is unusable.
    #[error("Invalid base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Errors that can occur within a `ChartClient` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider has nothing for this symbol (unknown symbol, null or empty body).
    #[error("No data returned for {symbol}")]
    NoData { symbol: String },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),

    /// An error during provider configuration or initialization.
    #[error("Provider initialization error: {0}")]
    Init(#[from] ProviderInitError),
}

impl ProviderError {
    /// Whether retrying the same request may succeed: timeouts, connection
    /// failures, rate limiting and server-side errors.
    pub fn is_retriable(&self) -> bool {
        match self {
            ProviderError::Request(e) => e.is_timeout() || e.is_connect(),
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
