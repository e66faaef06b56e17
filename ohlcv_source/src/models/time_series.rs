//! A complete, immutable set of bars for a single symbol.
//!
//! [`TimeSeriesBuilder`] accumulates bars in the order the source delivered
//! them and tags the result with currency and sampling period. Once built, a
//! [`TimeSeries`] exposes read-only accessors only; the one transformation
//! offered, [`clamp_to_window`], consumes the series and returns a new one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    bar::Bar,
    chart_range::ChartRange,
    currency::Currency,
    period::{PeriodPolicy, SamplingPeriod},
};

/// Bars for exactly one symbol plus the metadata describing them.
///
/// Bars are kept in source order; nothing re-sorts them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    name: String,
    currency: Currency,
    period: SamplingPeriod,
    bars: Vec<Bar>,
}

impl TimeSeries {
    /// An empty series, used when a symbol has no data or its fetch failed.
    pub fn empty(name: impl Into<String>, currency: Currency, period: SamplingPeriod) -> Self {
        Self {
            name: name.into(),
            currency,
            period,
            bars: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn period(&self) -> SamplingPeriod {
        self.period
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

/// Accumulates normalized bars for one symbol.
#[derive(Debug)]
pub struct TimeSeriesBuilder {
    name: String,
    currency: Currency,
    bars: Vec<Bar>,
}

impl TimeSeriesBuilder {
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
            bars: Vec::new(),
        }
    }

    pub fn with_capacity(name: impl Into<String>, currency: Currency, capacity: usize) -> Self {
        Self {
            name: name.into(),
            currency,
            bars: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// Finishes the series, classifying its period from the bars collected so
    /// far and the range they were requested with.
    pub fn build(self, policy: &PeriodPolicy, range: ChartRange) -> TimeSeries {
        let timestamps: Vec<DateTime<Utc>> = self.bars.iter().map(|b| b.timestamp).collect();
        let period = policy.classify(range, &timestamps);
        TimeSeries {
            name: self.name,
            currency: self.currency,
            period,
            bars: self.bars,
        }
    }
}

/// Keeps the bars with `from <= timestamp < to`, preserving order and metadata.
///
/// Chart endpoints are queried by coarse range size, so bars outside the
/// caller's window have to be dropped after normalization.
pub fn clamp_to_window(series: TimeSeries, from: DateTime<Utc>, to: DateTime<Utc>) -> TimeSeries {
    let TimeSeries {
        name,
        currency,
        period,
        bars,
    } = series;
    let bars = bars
        .into_iter()
        .filter(|b| b.timestamp >= from && b.timestamp < to)
        .collect();
    TimeSeries {
        name,
        currency,
        period,
        bars,
    }
}
