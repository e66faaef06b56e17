use thiserror::Error;

use crate::{
    models::symbol::SymbolKeyError, normalize::NormalizeError, providers::ProviderError,
    settings::SettingsError,
};

/// The unified error type for the `ohlcv_source` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from a chart client (transport, API, decoding).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A chart record could not be turned into a bar.
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid symbol: {0}")]
    Symbol(#[from] SymbolKeyError),
}

impl From<crate::providers::ProviderInitError> for Error {
    fn from(err: crate::providers::ProviderInitError) -> Self {
        Error::Provider(ProviderError::Init(err))
    }
}
