use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolKeyError {
    #[error("symbol key must not be empty")]
    Empty,
}

/// Identifier of a tradable instrument for a given source (e.g. `"AAPL"`).
///
/// Equality and hashing use the underlying string verbatim; no case folding is
/// applied, so `"aapl"` and `"AAPL"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolKey(String);

impl SymbolKey {
    pub fn new(symbol: impl Into<String>) -> Result<Self, SymbolKeyError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(SymbolKeyError::Empty);
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SymbolKey {
    type Err = SymbolKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SymbolKey {
    type Error = SymbolKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SymbolKey> for String {
    fn from(key: SymbolKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SymbolKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
