pub mod commands;

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    models::{
        chart_range::ChartRange,
        symbol::{SymbolKey, SymbolKeyError},
        time_series::TimeSeries,
    },
    settings::{SettingsError, SourceSettings},
};

/// Command-line changes to the loaded settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsEdit {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub range: Option<ChartRange>,
}

impl SettingsEdit {
    pub fn apply(&self, settings: &mut SourceSettings) {
        if let Some(from) = self.from {
            settings.from = from;
        }
        if let Some(to) = self.to {
            settings.to = to;
        }
        if let Some(range) = self.range {
            settings.range = range;
        }
    }
}

/// Settings a data source is built from: the file at `config`, environment
/// overrides, then `edit`.
pub fn settings_for_source(config: &Path, edit: SettingsEdit) -> Result<SourceSettings, SettingsError> {
    let mut settings = SourceSettings::load(config)?.apply_env_overrides()?;
    edit.apply(&mut settings);
    Ok(settings)
}

/// Applies `edit` to the file at `config` and saves the result to `target`.
/// Environment overrides are left out so they never end up in the file.
pub fn save_edited_settings(
    config: &Path,
    target: &Path,
    edit: SettingsEdit,
) -> Result<SourceSettings, SettingsError> {
    let mut settings = SourceSettings::load(config)?;
    edit.apply(&mut settings);
    settings.save(target)?;
    Ok(settings)
}

/// Splits a comma-separated symbol list, skipping blank entries.
pub fn parse_symbols(raw: &str) -> Result<Vec<SymbolKey>, SymbolKeyError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SymbolKey::new)
        .collect()
}

/// One printed line per fetched series.
#[derive(Debug, Serialize)]
pub struct SeriesSummary<'a> {
    pub symbol: &'a str,
    pub currency: &'a str,
    pub period: &'a str,
    pub bars: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

impl<'a> From<&'a TimeSeries> for SeriesSummary<'a> {
    fn from(series: &'a TimeSeries) -> Self {
        Self {
            symbol: series.name(),
            currency: series.currency().code(),
            period: series.period().as_str(),
            bars: series.len(),
            first: series.first().map(|b| b.timestamp),
            last: series.last().map(|b| b.timestamp),
        }
    }
}
