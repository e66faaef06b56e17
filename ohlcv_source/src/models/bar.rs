//! Canonical in-memory representation of a single OHLCV observation.
//!
//! Every [`ChartClient`](crate::providers::ChartClient) record ends up as a
//! [`Bar`] after passing through the [`ChartNormalizer`](crate::normalize::ChartNormalizer),
//! regardless of how the source encoded its numbers or dates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The instant this bar is stamped with (UTC).
    ///
    /// Daily sources are stamped at noon of the trading date in the
    /// normalizer's zone, so the calendar date survives zone conversions.
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,

    /// Traded value for the bar. No current source supplies it.
    pub amount: Option<f64>,
}

impl Bar {
    /// Traded value, or `0.0` when the source did not report one.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }
}
