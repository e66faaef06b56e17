//! Query-window and transport settings for a data source.
//!
//! [`SourceSettings`] is an ordinary value injected into
//! [`IexDataSource`](crate::source::iex::IexDataSource); nothing here is
//! global. The lifecycle is explicit:
//!
//! - [`SourceSettings::load`] reads a TOML file (a missing file yields defaults)
//!   and validates it.
//! - [`SourceSettings::validate`] checks the window (`from` strictly before
//!   `to`) and the numeric knobs.
//! - [`SourceSettings::save`] validates first and refuses to persist invalid
//!   settings, leaving any existing file untouched.
//!
//! ```toml
//! range = "1y"
//! from = "2020-01-01"
//! to = "2021-01-01"
//! fallback_currency = "USD"
//! max_concurrency = 4
//!
//! [currencies]
//! SAP = "EUR"
//!
//! [period_overrides]
//! "5y" = "week"
//!
//! [transport]
//! base_url = "https://cloud.iexapis.com/stable"
//! requests_per_second = 10
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Days, Local, Months, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use shared_utils::env::{InvalidEnvVarError, get_optional_env_var, parse_optional_env_var};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    models::{
        chart_range::{ChartRange, ChartRangeError},
        currency::{Currency, CurrencyTable},
        period::{PeriodPolicy, SamplingPeriod},
    },
    utils::tz::{BarZone, DstPolicy},
};

/// Default chart endpoint.
pub const DEFAULT_BASE_URL: &str = "https://cloud.iexapis.com/stable";

/// Environment variable overriding [`TransportSettings::base_url`].
pub const BASE_URL_ENV: &str = "IEX_BASE_URL";

/// Environment variable overriding [`TransportSettings::requests_per_second`].
pub const REQUESTS_PER_SECOND_ENV: &str = "IEX_REQUESTS_PER_SECOND";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Settings not saved: from ({from}) is not before to ({to})")]
    InvalidWindow { from: NaiveDate, to: NaiveDate },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error(transparent)]
    InvalidEnv(#[from] InvalidEnvVarError),
}

/// HTTP transport knobs for the chart client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    pub base_url: String,
    pub requests_per_second: u32,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: 10,
            max_retries: 3,
            base_delay_ms: 250,
            timeout_secs: 30,
        }
    }
}

/// Everything a data source needs besides the client itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    /// Range size requested from the chart endpoint.
    pub range: ChartRange,
    /// First day of the query window (inclusive).
    pub from: NaiveDate,
    /// Last day of the query window (inclusive).
    pub to: NaiveDate,
    /// Currency for symbols missing from `currencies`.
    pub fallback_currency: Currency,
    /// Listing currency per symbol.
    pub currencies: IndexMap<String, Currency>,
    /// Range → period entries replacing the built-in table. Keys are range
    /// path segments such as `"5y"`.
    pub period_overrides: IndexMap<String, SamplingPeriod>,
    /// IANA zone used to stamp bars; system local time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Upper bound on concurrent fetches in a batch. `1` is strictly sequential.
    pub max_concurrency: usize,
    pub transport: TransportSettings,
}

impl Default for SourceSettings {
    fn default() -> Self {
        let to = Local::now().date_naive();
        let from = to.checked_sub_months(Months::new(12)).unwrap_or(to);
        Self {
            range: ChartRange::default(),
            from,
            to,
            fallback_currency: Currency::usd(),
            currencies: IndexMap::new(),
            period_overrides: IndexMap::new(),
            time_zone: None,
            max_concurrency: 4,
            transport: TransportSettings::default(),
        }
    }
}

impl SourceSettings {
    /// Reads and validates settings from `path`. A missing file yields the
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), range = %settings.range, from = %settings.from, to = %settings.to, "settings loaded");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: SourceSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates and writes the settings to `path`, creating parent
    /// directories as needed. Invalid settings are not written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        self.validate()?;
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(from = %self.from, to = %self.to, range = %self.range, "settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.from >= self.to {
            return Err(SettingsError::InvalidWindow {
                from: self.from,
                to: self.to,
            });
        }
        if self.max_concurrency == 0 {
            return Err(invalid("max_concurrency", "must be at least 1"));
        }
        if self.transport.requests_per_second == 0 {
            return Err(invalid("transport.requests_per_second", "must be at least 1"));
        }
        if self.transport.timeout_secs == 0 {
            return Err(invalid("transport.timeout_secs", "must be at least 1"));
        }
        Url::parse(&self.transport.base_url)
            .map_err(|e| invalid("transport.base_url", e.to_string()))?;
        self.bar_zone()?;
        self.period_policy()?;
        Ok(())
    }

    /// Replaces transport values that have an environment override
    /// (`IEX_BASE_URL`, `IEX_REQUESTS_PER_SECOND`). Meant for the settings a
    /// data source is built from, not for settings that are saved again.
    pub fn apply_env_overrides(mut self) -> Result<Self, SettingsError> {
        if let Some(base_url) = get_optional_env_var(BASE_URL_ENV) {
            debug!(%base_url, "base URL overridden from environment");
            self.transport.base_url = base_url;
        }
        if let Some(rps) = parse_optional_env_var::<u32>(REQUESTS_PER_SECOND_ENV)? {
            debug!(rps, "request rate overridden from environment");
            self.transport.requests_per_second = rps;
        }
        Ok(self)
    }

    /// The configured window as UTC instants: local midnight starting `from`
    /// up to, but excluding, local midnight after `to`, both in
    /// [`bar_zone`](Self::bar_zone). Bars stamped during those local days fall
    /// inside the window whatever the zone's offset.
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), SettingsError> {
        let zone = self.bar_zone()?;
        let after_to = self
            .to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| invalid("to", "no day follows it"))?;
        Ok((local_midnight(zone, self.from)?, local_midnight(zone, after_to)?))
    }

    pub fn bar_zone(&self) -> Result<BarZone, SettingsError> {
        match &self.time_zone {
            None => Ok(BarZone::SystemLocal),
            Some(name) => BarZone::parse(name).map_err(|e| invalid("time_zone", e.to_string())),
        }
    }

    pub fn period_policy(&self) -> Result<PeriodPolicy, SettingsError> {
        let mut overrides = IndexMap::with_capacity(self.period_overrides.len());
        for (range, period) in &self.period_overrides {
            let range: ChartRange = range
                .parse()
                .map_err(|e: ChartRangeError| invalid("period_overrides", e.to_string()))?;
            overrides.insert(range, *period);
        }
        Ok(PeriodPolicy::with_overrides(overrides))
    }

    pub fn currency_table(&self) -> CurrencyTable {
        CurrencyTable::with_entries(self.fallback_currency.clone(), self.currencies.clone())
    }
}

fn local_midnight(zone: BarZone, day: NaiveDate) -> Result<DateTime<Utc>, SettingsError> {
    zone.to_utc(day.and_time(NaiveTime::MIN), DstPolicy::ShiftForward)
        .map_err(|e| invalid("time_zone", e.to_string()))
}

fn invalid(field: &'static str, message: impl Into<String>) -> SettingsError {
    SettingsError::InvalidValue {
        field,
        message: message.into(),
    }
}
