//! Sampling period classification.
//!
//! A [`SamplingPeriod`] describes how far apart the bars of a series are. Two
//! pieces of evidence are available when a series is assembled: the
//! [`ChartRange`] that was requested and the timestamps that actually came
//! back. [`PeriodPolicy::classify`] is the single place that turns them into
//! a period:
//!
//! - With at least two bars, the smallest positive spacing between
//!   consecutive timestamps decides.
//! - Otherwise the range table decides (`Dynamic` → minute, `Intraday` →
//!   realtime, anything else → day, unless overridden).
//!
//! ```
//! use ohlcv_source::models::{chart_range::ChartRange, period::{PeriodPolicy, SamplingPeriod}};
//!
//! let policy = PeriodPolicy::default();
//! assert_eq!(policy.range_to_period(ChartRange::Dynamic), SamplingPeriod::Minute);
//! assert_eq!(policy.classify(ChartRange::Intraday, &[]), SamplingPeriod::Realtime);
//! ```

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::chart_range::ChartRange;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sampling period: {0:?}")]
pub struct SamplingPeriodError(pub String);

/// Spacing class of the bars in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPeriod {
    /// Tick or sub-minute data
    Realtime,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl SamplingPeriod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SamplingPeriod::Realtime => "realtime",
            SamplingPeriod::Minute => "minute",
            SamplingPeriod::Hour => "hour",
            SamplingPeriod::Day => "day",
            SamplingPeriod::Week => "week",
            SamplingPeriod::Month => "month",
            SamplingPeriod::Year => "year",
        }
    }

    /// Classifies a bar spacing.
    ///
    /// Bounds are loose around day and week so that daily bars stamped at
    /// local noon (23h or 25h apart across a DST change) still read as daily.
    pub fn from_spacing(spacing: TimeDelta) -> Self {
        if spacing < TimeDelta::seconds(60) {
            SamplingPeriod::Realtime
        } else if spacing < TimeDelta::hours(1) {
            SamplingPeriod::Minute
        } else if spacing < TimeDelta::hours(20) {
            SamplingPeriod::Hour
        } else if spacing < TimeDelta::days(6) {
            SamplingPeriod::Day
        } else if spacing < TimeDelta::days(25) {
            SamplingPeriod::Week
        } else if spacing < TimeDelta::days(300) {
            SamplingPeriod::Month
        } else {
            SamplingPeriod::Year
        }
    }
}

impl fmt::Display for SamplingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingPeriod {
    type Err = SamplingPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" => Ok(SamplingPeriod::Realtime),
            "minute" => Ok(SamplingPeriod::Minute),
            "hour" => Ok(SamplingPeriod::Hour),
            "day" => Ok(SamplingPeriod::Day),
            "week" => Ok(SamplingPeriod::Week),
            "month" => Ok(SamplingPeriod::Month),
            "year" => Ok(SamplingPeriod::Year),
            _ => Err(SamplingPeriodError(s.to_string())),
        }
    }
}

/// Range → period table plus spacing-based classification.
#[derive(Debug, Clone, Default)]
pub struct PeriodPolicy {
    overrides: IndexMap<ChartRange, SamplingPeriod>,
}

impl PeriodPolicy {
    pub fn with_overrides(overrides: IndexMap<ChartRange, SamplingPeriod>) -> Self {
        Self { overrides }
    }

    pub fn set_override(&mut self, range: ChartRange, period: SamplingPeriod) {
        self.overrides.insert(range, period);
    }

    /// Period implied by the requested range alone.
    ///
    /// The default table is a heuristic over the endpoint's documented ranges,
    /// which is why entries can be overridden.
    pub fn range_to_period(&self, range: ChartRange) -> SamplingPeriod {
        if let Some(period) = self.overrides.get(&range) {
            return *period;
        }
        match range {
            ChartRange::Dynamic => SamplingPeriod::Minute,
            ChartRange::Intraday => SamplingPeriod::Realtime,
            _ => SamplingPeriod::Day,
        }
    }

    /// Canonical period for a series fetched with `range` whose bars carry
    /// `timestamps` (in series order).
    pub fn classify(&self, range: ChartRange, timestamps: &[DateTime<Utc>]) -> SamplingPeriod {
        match smallest_positive_spacing(timestamps) {
            Some(spacing) => SamplingPeriod::from_spacing(spacing),
            None => self.range_to_period(range),
        }
    }
}

fn smallest_positive_spacing(timestamps: &[DateTime<Utc>]) -> Option<TimeDelta> {
    timestamps
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > TimeDelta::zero())
        .min()
}
