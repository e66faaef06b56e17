use std::{fmt, num::NonZeroU32, sync::Arc, time::Duration};

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode, Url};
use secrecy::SecretString;
use shared_utils::env::get_optional_env_var;
use tracing::{debug, instrument};

use crate::{
    models::request_params::ChartRequest,
    providers::{
        ChartClient, ProviderError, ProviderInitError,
        iex_rest::{
            params::{chart_url, construct_params},
            response::ChartRecord,
        },
        retry::{RetryPolicy, retry_with_backoff},
    },
    settings::TransportSettings,
};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "IEX_API_TOKEN";

const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = nonzero!(10u32);

/// Direct (non-keyed) rate limiter shared by all requests of one client.
type IexRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// REST client for `/stock/{symbol}/chart/{range}`.
///
/// Requests are throttled by a shared rate limiter and retried with
/// exponential backoff on throttling, server errors and timeouts.
#[derive(Clone)]
pub struct IexRestClient {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
    rate_limiter: Arc<IexRateLimiter>,
    retry: RetryPolicy,
}

impl fmt::Debug for IexRestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IexRestClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("retry", &self.retry)
            .finish()
    }
}

impl IexRestClient {
    /// Creates a client from transport settings.
    ///
    /// Reads the optional API token from the `IEX_API_TOKEN` environment variable.
    pub fn new(settings: &TransportSettings) -> Result<Self, ProviderInitError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(ProviderInitError::ClientBuild)?;
        let rps = NonZeroU32::new(settings.requests_per_second).unwrap_or(DEFAULT_REQUESTS_PER_SECOND);
        let token = get_optional_env_var(TOKEN_ENV).map(SecretString::from);

        Ok(Self {
            client,
            base_url,
            token,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
            retry: RetryPolicy::new(settings.max_retries, settings.base_delay_ms),
        })
    }

    /// Creates a client against `base_url` with default transport settings
    /// and no token. Useful for mock servers.
    pub fn with_base_url(base_url: &str) -> Result<Self, ProviderInitError> {
        let settings = TransportSettings {
            base_url: base_url.to_string(),
            ..TransportSettings::default()
        };
        let mut client = Self::new(&settings)?;
        client.token = None;
        Ok(client)
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch_once(
        &self,
        url: &Url,
        query: &[(String, String)],
        symbol: &str,
    ) -> Result<Vec<ChartRecord>, ProviderError> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        match serde_json::from_str::<Option<Vec<ChartRecord>>>(&body)? {
            Some(records) if !records.is_empty() => Ok(records),
            _ => Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ProviderInitError> {
    let url = Url::parse(raw).map_err(|e| ProviderInitError::InvalidBaseUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderInitError::InvalidBaseUrl {
            url: raw.to_string(),
            message: "URL cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

#[async_trait]
impl ChartClient for IexRestClient {
    #[instrument(skip(self, request), fields(symbol = %request.symbol, range = %request.range))]
    async fn fetch_chart(&self, request: &ChartRequest) -> Result<Vec<ChartRecord>, ProviderError> {
        let url = chart_url(&self.base_url, request)?;
        let query = construct_params(self.token.as_ref());
        let symbol = request.symbol.as_str();

        let (url, query) = (&url, query.as_slice());
        let records = retry_with_backoff(&self.retry, ProviderError::is_retriable, move || {
            self.fetch_once(url, query, symbol)
        })
        .await?;

        debug!(records = records.len(), "chart fetched");
        Ok(records)
    }
}
