use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{chart_range::ChartRange, symbol::SymbolKey};

/// Parameters of a single chart request handed to a
/// [`ChartClient`](crate::providers::ChartClient).
///
/// The explicit bounds are always carried along. Clients whose endpoint can
/// only be queried by range size may ignore them; the data source clamps the
/// normalized series to `[start, end)` either way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Symbol to request (e.g. `"AAPL"`).
    pub symbol: SymbolKey,

    /// Range size understood by the endpoint.
    pub range: ChartRange,

    /// Start of the requested window (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested window (exclusive, UTC).
    pub end: DateTime<Utc>,
}

impl ChartRequest {
    pub fn new(
        symbol: SymbolKey,
        range: ChartRange,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            range,
            start,
            end,
        }
    }
}
