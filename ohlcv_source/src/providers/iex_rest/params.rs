use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

use crate::{models::request_params::ChartRequest, providers::ProviderError};

/// Builds `{base}/stock/{symbol}/chart/{range}`; path segments are
/// percent-encoded, so symbols like `BRK/B` stay a single segment.
pub fn chart_url(base_url: &Url, request: &ChartRequest) -> Result<Url, ProviderError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::Validation(format!("base URL {base_url} cannot carry a path")))?
        .pop_if_empty()
        .extend([
            "stock",
            request.symbol.as_str(),
            "chart",
            request.range.as_path_segment(),
        ]);
    Ok(url)
}

/// Query parameters for a chart request. Range and symbol travel in the path,
/// so only credentials end up here.
pub fn construct_params(token: Option<&SecretString>) -> Vec<(String, String)> {
    let mut query_params = Vec::new();
    if let Some(token) = token {
        query_params.push(("token".to_string(), token.expose_secret().to_string()));
    }
    query_params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{chart_range::ChartRange, symbol::SymbolKey};
    use chrono::{TimeZone, Utc};

    fn request(symbol: &str, range: ChartRange) -> ChartRequest {
        ChartRequest::new(
            SymbolKey::new(symbol).unwrap(),
            range,
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn url_keeps_base_path() {
        let base = Url::parse("https://cloud.iexapis.com/stable/").unwrap();
        let url = chart_url(&base, &request("AAPL", ChartRange::OneMonth)).unwrap();
        assert_eq!(url.as_str(), "https://cloud.iexapis.com/stable/stock/AAPL/chart/1m");
    }

    #[test]
    fn url_encodes_symbol_segment() {
        let base = Url::parse("http://localhost:8080").unwrap();
        let url = chart_url(&base, &request("BRK/B", ChartRange::YearToDate)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/stock/BRK%2FB/chart/ytd");
    }

    #[test]
    fn token_is_sent_only_when_configured() {
        let token = SecretString::from("pk_test");
        assert_eq!(
            construct_params(Some(&token)),
            vec![("token".to_string(), "pk_test".to_string())]
        );
        assert!(construct_params(None).is_empty());
    }
}
