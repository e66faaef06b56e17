use serde::{Deserialize, Serialize};

/// Numeric field as the chart endpoint encodes it: usually a JSON number,
/// occasionally a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceNumber {
    Number(f64),
    Text(String),
}

impl From<f64> for SourceNumber {
    fn from(value: f64) -> Self {
        SourceNumber::Number(value)
    }
}

/// One record of a chart response.
///
/// Only the fields the normalizer reads are modelled; the endpoint sends many
/// more (`change`, `label`, adjusted prices, ...) which are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartRecord {
    /// Trading date, `YYYY-MM-DD` for daily ranges or `YYYYMMDD` for intraday.
    pub date: String,
    /// Time of day (`HH:MM`) for intraday records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
    #[serde(default)]
    pub open: Option<SourceNumber>,
    #[serde(default)]
    pub high: Option<SourceNumber>,
    #[serde(default)]
    pub low: Option<SourceNumber>,
    #[serde(default)]
    pub close: Option<SourceNumber>,
    #[serde(default)]
    pub volume: Option<SourceNumber>,
}

impl ChartRecord {
    /// Daily record with numeric OHLCV fields.
    pub fn daily(date: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date: date.to_string(),
            minute: None,
            open: Some(open.into()),
            high: Some(high.into()),
            low: Some(low.into()),
            close: Some(close.into()),
            volume: Some(volume.into()),
        }
    }
}
