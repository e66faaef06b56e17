//! Conversion of chart records into [`TimeSeries`].
//!
//! Each [`ChartRecord`] becomes one [`Bar`]:
//!
//! - The date (`YYYY-MM-DD`, or `YYYYMMDD` for intraday records) is combined
//!   with the record's `minute` when present, otherwise with 12:00:00, and
//!   interpreted in the normalizer's [`BarZone`]. Noon keeps the calendar date
//!   stable when the instant is later viewed from another zone.
//! - Open/high/low/close/volume all pass through [`coerce_number`].
//! - `amount` has no source field and stays `None`.
//!
//! Malformed records are not skipped: the first bad record fails the whole
//! conversion so the caller can decide what a broken symbol is worth.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::{
    models::{
        bar::Bar,
        chart_range::ChartRange,
        currency::{Currency, CurrencyLookup, CurrencyTable},
        period::PeriodPolicy,
        time_series::{TimeSeries, TimeSeriesBuilder},
    },
    providers::iex_rest::response::{ChartRecord, SourceNumber},
    utils::tz::{BarZone, DstPolicy, TzError},
};

/// Time of day daily records are stamped with.
pub const DAILY_BAR_TIME: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(t) => t,
    None => panic!("noon is a valid time"),
};

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("invalid date {value:?}")]
    InvalidDate { value: String },

    #[error("invalid minute {value:?}")]
    InvalidTime { value: String },

    #[error("missing {field}")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("negative {field}: {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error(transparent)]
    Time(#[from] TzError),
}

/// Coerces one source numeric field into a finite, non-negative `f64`.
pub fn coerce_number(
    field: &'static str,
    value: Option<&SourceNumber>,
) -> Result<f64, NormalizeError> {
    let number = match value {
        None => return Err(NormalizeError::MissingField { field }),
        Some(SourceNumber::Number(n)) => *n,
        Some(SourceNumber::Text(s)) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| NormalizeError::InvalidNumber {
                    field,
                    value: s.clone(),
                })?
        }
    };
    if !number.is_finite() {
        return Err(NormalizeError::InvalidNumber {
            field,
            value: number.to_string(),
        });
    }
    if number < 0.0 {
        return Err(NormalizeError::NegativeValue {
            field,
            value: number,
        });
    }
    Ok(number)
}

fn parse_date(value: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map_err(|_| NormalizeError::InvalidDate {
            value: value.to_string(),
        })
}

fn parse_minute(value: &str) -> Result<NaiveTime, NormalizeError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| NormalizeError::InvalidTime {
        value: value.to_string(),
    })
}

/// Turns chart records into time series.
#[derive(Clone)]
pub struct ChartNormalizer {
    zone: BarZone,
    policy: PeriodPolicy,
    currencies: Arc<dyn CurrencyLookup>,
}

impl Default for ChartNormalizer {
    fn default() -> Self {
        Self::new(
            BarZone::SystemLocal,
            PeriodPolicy::default(),
            Arc::new(CurrencyTable::new(Currency::usd())),
        )
    }
}

impl std::fmt::Debug for ChartNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartNormalizer")
            .field("zone", &self.zone)
            .field("policy", &self.policy)
            .field("fallback_currency", &self.currencies.fallback())
            .finish()
    }
}

impl ChartNormalizer {
    pub fn new(zone: BarZone, policy: PeriodPolicy, currencies: Arc<dyn CurrencyLookup>) -> Self {
        Self {
            zone,
            policy,
            currencies,
        }
    }

    pub fn zone(&self) -> BarZone {
        self.zone
    }

    pub fn policy(&self) -> &PeriodPolicy {
        &self.policy
    }

    pub fn currency_for(&self, symbol: &str) -> Currency {
        self.currencies.resolve(symbol)
    }

    /// Empty series carrying the same metadata a fetch for `name` would get.
    pub fn placeholder(&self, name: &str, range: ChartRange) -> TimeSeries {
        TimeSeries::empty(
            name,
            self.currency_for(name),
            self.policy.range_to_period(range),
        )
    }

    pub fn normalize_record(&self, record: &ChartRecord) -> Result<Bar, NormalizeError> {
        let date = parse_date(&record.date)?;
        let time = match &record.minute {
            Some(minute) => parse_minute(minute)?,
            None => DAILY_BAR_TIME,
        };
        let timestamp = self
            .zone
            .to_utc(date.and_time(time), DstPolicy::ShiftForward)?;

        Ok(Bar {
            timestamp,
            open: coerce_number("open", record.open.as_ref())?,
            high: coerce_number("high", record.high.as_ref())?,
            low: coerce_number("low", record.low.as_ref())?,
            close: coerce_number("close", record.close.as_ref())?,
            volume: coerce_number("volume", record.volume.as_ref())?,
            amount: None,
        })
    }

    /// Converts `records` (in source order) into the series `name`.
    pub fn normalize(
        &self,
        name: &str,
        range: ChartRange,
        records: &[ChartRecord],
    ) -> Result<TimeSeries, NormalizeError> {
        let mut builder =
            TimeSeriesBuilder::with_capacity(name, self.currency_for(name), records.len());
        for record in records {
            builder.push(self.normalize_record(record)?);
        }
        Ok(builder.build(&self.policy, range))
    }
}
