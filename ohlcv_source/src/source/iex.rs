use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures::{StreamExt, stream};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    errors::Error,
    models::{
        chart_range::ChartRange,
        period::SamplingPeriod,
        request_params::ChartRequest,
        symbol::SymbolKey,
        time_series::{TimeSeries, clamp_to_window},
    },
    normalize::ChartNormalizer,
    providers::{ChartClient, ProviderError, iex_rest::IexRestClient},
    settings::SourceSettings,
    source::OhlcvDataSource,
};

/// Symbol requested by [`IexDataSource::connect`].
pub const PROBE_SYMBOL: &str = "AAPL";
/// Range requested by [`IexDataSource::connect`].
pub const PROBE_RANGE: ChartRange = ChartRange::OneMonth;

/// Data source backed by an IEX-style chart client.
///
/// The client is created once and shared by every call; each call produces an
/// independent [`TimeSeries`].
pub struct IexDataSource {
    client: Arc<dyn ChartClient>,
    normalizer: ChartNormalizer,
    range: ChartRange,
    max_concurrency: usize,
    probe_key: SymbolKey,
}

impl std::fmt::Debug for IexDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IexDataSource")
            .field("normalizer", &self.normalizer)
            .field("range", &self.range)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl IexDataSource {
    /// Creates a data source talking to the REST endpoint described by
    /// `settings.transport`.
    pub fn new(settings: &SourceSettings) -> Result<Self, Error> {
        let client = IexRestClient::new(&settings.transport)?;
        Self::with_client(Arc::new(client), settings)
    }

    /// Creates a data source on top of an existing client.
    pub fn with_client(client: Arc<dyn ChartClient>, settings: &SourceSettings) -> Result<Self, Error> {
        settings.validate()?;
        let normalizer = ChartNormalizer::new(
            settings.bar_zone()?,
            settings.period_policy()?,
            Arc::new(settings.currency_table()),
        );
        Ok(Self {
            client,
            normalizer,
            range: settings.range,
            max_concurrency: settings.max_concurrency.max(1),
            probe_key: SymbolKey::new(PROBE_SYMBOL)?,
        })
    }

    /// Range size every request is made with.
    pub fn range(&self) -> ChartRange {
        self.range
    }

    pub fn normalizer(&self) -> &ChartNormalizer {
        &self.normalizer
    }

    /// Period implied by `range` alone, per the configured policy table.
    pub fn range_to_period(&self, range: ChartRange) -> SamplingPeriod {
        self.normalizer.policy().range_to_period(range)
    }

    async fn fetch_or_placeholder(
        &self,
        key: &SymbolKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        requested: &str,
    ) -> TimeSeries {
        match self.get_symbol_data_in(key, from, to).await {
            Ok(series) => series,
            Err(e) => {
                error!(symbol = %key, symbols = %requested, error = %e, "error requesting data, substituting empty series");
                self.normalizer.placeholder(key.as_str(), self.range)
            }
        }
    }
}

#[async_trait]
impl OhlcvDataSource for IexDataSource {
    type Key = SymbolKey;
    type Handle = ();

    async fn get_all_available_symbols(&self) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    #[instrument(skip(self), fields(symbol = %key, range = %self.range))]
    async fn get_symbol_data_in(
        &self,
        key: &SymbolKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<TimeSeries, Error> {
        let request = ChartRequest::new(key.clone(), self.range, from, to);
        let records = match self.client.fetch_chart(&request).await {
            Ok(records) => records,
            Err(e @ ProviderError::NoData { .. }) => {
                warn!(error = %e, "no chart data, returning empty series");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let series = self.normalizer.normalize(key.as_str(), self.range, &records)?;
        let fetched = series.len();
        let series = clamp_to_window(series, from, to);
        debug!(fetched, kept = series.len(), period = %series.period(), "series normalized");
        Ok(series)
    }

    async fn get_symbols_data(
        &self,
        keys: &[SymbolKey],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<TimeSeries> {
        if keys.is_empty() {
            return Vec::new();
        }
        let requested = keys
            .iter()
            .map(SymbolKey::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let requested = requested.as_str();

        let fetches: Vec<_> = keys
            .iter()
            .map(|key| self.fetch_or_placeholder(key, from, to, requested))
            .collect();
        let series: Vec<TimeSeries> = stream::iter(fetches)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        info!(
            symbols = keys.len(),
            empty = series.iter().filter(|s| s.is_empty()).count(),
            "batch fetched"
        );
        series
    }

    /// Requests a month of [`PROBE_SYMBOL`] charts. Any answer from the
    /// service counts as reachable, including "no data" (404, `null`, `[]`);
    /// transport and API failures yield `false`.
    async fn connect(&self, _handle: &()) -> bool {
        let now = Utc::now();
        let request = ChartRequest::new(
            self.probe_key.clone(),
            PROBE_RANGE,
            now - TimeDelta::days(31),
            now,
        );
        match self.client.fetch_chart(&request).await {
            Ok(_) => true,
            Err(e @ ProviderError::NoData { .. }) => {
                debug!(symbol = %self.probe_key, error = %e, "connectivity check answered without data");
                true
            }
            Err(e) => {
                error!(symbol = %self.probe_key, error = %e, "connectivity probe failed");
                false
            }
        }
    }

    async fn is_ready(&self) -> bool {
        self.connect(&()).await
    }

    async fn disconnect(&self) {
        debug!("disconnect requested; the chart client holds no connection");
    }
}
