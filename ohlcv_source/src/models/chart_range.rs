use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown chart range: {0:?}")]
pub struct ChartRangeError(pub String);

/// Range size understood by the chart endpoint.
///
/// The serialized form is the path segment the endpoint expects
/// (`/chart/{range}`), e.g. `"1m"` or `"ytd"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartRange {
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "2y")]
    TwoYears,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "5d")]
    FiveDays,
    /// Minute bars of the latest trading day.
    #[serde(rename = "1d")]
    Intraday,
    /// Let the endpoint pick: intraday while the market is open, otherwise one month.
    Dynamic,
}

impl ChartRange {
    pub const ALL: [ChartRange; 10] = [
        ChartRange::FiveYears,
        ChartRange::TwoYears,
        ChartRange::OneYear,
        ChartRange::YearToDate,
        ChartRange::SixMonths,
        ChartRange::ThreeMonths,
        ChartRange::OneMonth,
        ChartRange::FiveDays,
        ChartRange::Intraday,
        ChartRange::Dynamic,
    ];

    pub const fn as_path_segment(&self) -> &'static str {
        match self {
            ChartRange::FiveYears => "5y",
            ChartRange::TwoYears => "2y",
            ChartRange::OneYear => "1y",
            ChartRange::YearToDate => "ytd",
            ChartRange::SixMonths => "6m",
            ChartRange::ThreeMonths => "3m",
            ChartRange::OneMonth => "1m",
            ChartRange::FiveDays => "5d",
            ChartRange::Intraday => "1d",
            ChartRange::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

impl FromStr for ChartRange {
    type Err = ChartRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ChartRange::ALL
            .into_iter()
            .find(|r| r.as_path_segment() == wanted)
            .ok_or_else(|| ChartRangeError(s.to_string()))
    }
}
