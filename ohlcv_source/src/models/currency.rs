//! Listing currency of an instrument and the lookup that resolves it.
//!
//! Sources rarely report the currency alongside chart records, so the
//! currency attached to a [`TimeSeries`](crate::models::time_series::TimeSeries)
//! comes from a [`CurrencyLookup`] keyed by symbol, with a configured
//! fallback for symbols the lookup does not know.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::symbol::SymbolKey;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid currency code {0:?}: expected three ASCII letters")]
pub struct CurrencyError(pub String);

/// ISO-4217 shaped currency code (three uppercase ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, CurrencyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

/// Resolves the listing currency of a symbol.
pub trait CurrencyLookup: Send + Sync {
    /// Returns the currency for `symbol`, or `None` when unknown.
    fn lookup(&self, symbol: &str) -> Option<Currency>;

    /// Currency used when [`lookup`](Self::lookup) has no answer.
    fn fallback(&self) -> Currency;

    fn resolve(&self, symbol: &str) -> Currency {
        self.lookup(symbol).unwrap_or_else(|| self.fallback())
    }
}

/// Static symbol → currency table with a fallback.
#[derive(Debug, Clone, Default)]
pub struct CurrencyTable {
    entries: IndexMap<String, Currency>,
    fallback: Currency,
}

impl CurrencyTable {
    pub fn new(fallback: Currency) -> Self {
        Self {
            entries: IndexMap::new(),
            fallback,
        }
    }

    pub fn with_entries(fallback: Currency, entries: IndexMap<String, Currency>) -> Self {
        Self { entries, fallback }
    }

    pub fn insert(&mut self, symbol: &SymbolKey, currency: Currency) -> Option<Currency> {
        self.entries.insert(symbol.to_string(), currency)
    }
}

impl CurrencyLookup for CurrencyTable {
    fn lookup(&self, symbol: &str) -> Option<Currency> {
        self.entries.get(symbol).cloned()
    }

    fn fallback(&self) -> Currency {
        self.fallback.clone()
    }
}
