//! Client abstraction for chart data sources.
//!
//! [`ChartClient`] is the single outbound operation the data source needs:
//! "fetch chart records for symbol X over range R". Concrete clients (the
//! IEX REST client here, fakes in tests) implement it; the façade only ever
//! sees `dyn ChartClient`.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use ohlcv_source::models::request_params::ChartRequest;
//! use ohlcv_source::providers::{ChartClient, ChartRecord, ProviderError};
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl ChartClient for Offline {
//!     async fn fetch_chart(&self, request: &ChartRequest) -> Result<Vec<ChartRecord>, ProviderError> {
//!         Err(ProviderError::NoData { symbol: request.symbol.to_string() })
//!     }
//! }
//! ```

pub mod errors;
pub mod iex_rest;
pub mod retry;

use async_trait::async_trait;

pub use errors::{ProviderError, ProviderInitError};
pub use iex_rest::response::{ChartRecord, SourceNumber};

use crate::models::request_params::ChartRequest;

/// Fetches chart records from a market data service.
#[async_trait]
pub trait ChartClient: Send + Sync {
    /// Fetches the records for `request`, in the order the service returns them.
    ///
    /// Implementations report "the service has nothing for this symbol" as
    /// [`ProviderError::NoData`] so callers can tell it apart from failures.
    async fn fetch_chart(&self, request: &ChartRequest) -> Result<Vec<ChartRecord>, ProviderError>;
}
