//! The OHLCV data source façade.
//!
//! An [`OhlcvDataSource`] hands out [`TimeSeries`] for symbol keys. Single-key
//! fetches report failures as errors; the batch form never fails and instead
//! substitutes an empty placeholder for every symbol that could not be
//! fetched, so callers always get one series per requested key, in order.

pub mod iex;

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};

use crate::{errors::Error, models::time_series::TimeSeries};

/// How far back and forward [`OhlcvDataSource::get_symbol_data`] reaches.
pub const ALL_HISTORY_YEARS: u32 = 100;

/// The `now ± 100 years` window used when the caller asks for everything.
pub fn all_history_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let span = Months::new(ALL_HISTORY_YEARS * 12);
    (
        now.checked_sub_months(span).unwrap_or(DateTime::<Utc>::MIN_UTC),
        now.checked_add_months(span).unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

#[async_trait]
pub trait OhlcvDataSource: Send + Sync {
    /// Identifier of an instrument for this source.
    type Key: Send + Sync;
    /// Connection handle accepted by [`connect`](Self::connect).
    type Handle: Send + Sync;

    /// Symbols this source can serve. Sources without a listing endpoint
    /// return an empty list.
    async fn get_all_available_symbols(&self) -> Result<Vec<String>, Error>;

    /// All available history for `key`.
    async fn get_symbol_data(&self, key: &Self::Key) -> Result<TimeSeries, Error> {
        let (from, to) = all_history_window(Utc::now());
        self.get_symbol_data_in(key, from, to).await
    }

    /// History for `key` within `[from, to)`.
    async fn get_symbol_data_in(
        &self,
        key: &Self::Key,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<TimeSeries, Error>;

    /// One series per key, in key order. Keys whose fetch fails yield an
    /// empty placeholder series.
    async fn get_symbols_data(
        &self,
        keys: &[Self::Key],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<TimeSeries>;

    /// Probes the source. Never fails; problems are logged and reported as `false`.
    async fn connect(&self, handle: &Self::Handle) -> bool;

    async fn is_ready(&self) -> bool;

    async fn disconnect(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn all_history_spans_two_centuries() {
        let now = Utc.with_ymd_and_hms(2021, 3, 15, 12, 0, 0).unwrap();
        let (from, to) = all_history_window(now);
        assert_eq!(from.year(), 1921);
        assert_eq!(to.year(), 2121);
        assert_eq!((from.month(), from.day()), (3, 15));
    }
}
