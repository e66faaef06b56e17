//! OHLCV time series from an IEX-style chart endpoint.
//!
//! [`IexDataSource`] fetches chart records through a [`ChartClient`], turns
//! them into normalized [`TimeSeries`] and isolates per-symbol failures in
//! batch requests.

#[cfg(feature = "cli")]
pub mod cli;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod settings;
pub mod source;
pub mod utils;

pub use errors::Error;
pub use models::{
    bar::Bar,
    chart_range::ChartRange,
    currency::{Currency, CurrencyLookup, CurrencyTable},
    period::{PeriodPolicy, SamplingPeriod},
    symbol::SymbolKey,
    time_series::TimeSeries,
};
pub use normalize::ChartNormalizer;
pub use providers::{ChartClient, ChartRecord, ProviderError};
pub use settings::SourceSettings;
pub use source::{OhlcvDataSource, iex::IexDataSource};
