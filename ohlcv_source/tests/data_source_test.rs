use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ohlcv_source::{
    ChartClient, ChartRange, ChartRecord, Currency, Error, IexDataSource, OhlcvDataSource,
    ProviderError, SamplingPeriod, SourceSettings, SymbolKey,
    models::request_params::ChartRequest,
    providers::SourceNumber,
};
use proptest::prelude::*;

#[derive(Clone)]
enum Script {
    Records(Vec<ChartRecord>),
    NoData,
    ApiError(u16),
    Delayed(u64, Vec<ChartRecord>),
}

/// Chart client answering from a per-symbol script.
#[derive(Default)]
struct ScriptedClient {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: std::sync::Mutex<Vec<(String, ChartRange)>>,
}

impl ScriptedClient {
    fn with(mut self, symbol: &str, script: Script) -> Self {
        self.scripts.insert(symbol.to_string(), script);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChartClient for ScriptedClient {
    async fn fetch_chart(&self, request: &ChartRequest) -> Result<Vec<ChartRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((request.symbol.to_string(), request.range));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self
            .scripts
            .get(request.symbol.as_str())
            .cloned()
            .unwrap_or(Script::NoData);
        let result = match script {
            Script::Records(records) => Ok(records),
            Script::Delayed(ms, records) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(records)
            }
            Script::NoData => Err(ProviderError::NoData {
                symbol: request.symbol.to_string(),
            }),
            Script::ApiError(status) => Err(ProviderError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn march_2021() -> Vec<ChartRecord> {
    vec![
        ChartRecord::daily("2021-03-15", 120.0, 123.0, 119.5, 122.0, 1_000.0),
        ChartRecord::daily("2021-03-16", 122.0, 124.0, 121.0, 123.5, 1_200.0),
        ChartRecord::daily("2021-03-17", 123.5, 125.0, 122.5, 124.0, 900.0),
    ]
}

fn settings() -> SourceSettings {
    SourceSettings {
        range: ChartRange::OneYear,
        from: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        to: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        time_zone: Some("UTC".to_string()),
        ..SourceSettings::default()
    }
}

fn source(client: Arc<ScriptedClient>, settings: &SourceSettings) -> IexDataSource {
    IexDataSource::with_client(client, settings).unwrap()
}

fn keys(symbols: &[&str]) -> Vec<SymbolKey> {
    symbols.iter().map(|s| SymbolKey::new(*s).unwrap()).collect()
}

fn window(settings: &SourceSettings) -> (DateTime<Utc>, DateTime<Utc>) {
    settings.window().unwrap()
}

#[tokio::test]
async fn single_symbol_is_normalized_and_classified() {
    let client = Arc::new(ScriptedClient::default().with("AAPL", Script::Records(march_2021())));
    let settings = settings();
    let source = source(client.clone(), &settings);
    let (from, to) = window(&settings);

    let series = source
        .get_symbol_data_in(&SymbolKey::new("AAPL").unwrap(), from, to)
        .await
        .unwrap();

    assert_eq!(series.name(), "AAPL");
    assert_eq!(series.currency(), &Currency::usd());
    assert_eq!(series.period(), SamplingPeriod::Day);
    assert_eq!(series.len(), 3);
    assert_eq!(
        series.bars()[0].timestamp,
        Utc.with_ymd_and_hms(2021, 3, 15, 12, 0, 0).unwrap()
    );
    assert_eq!(series.bars()[1].close, 123.5);
    assert_eq!(series.bars()[2].amount, None);

    let requests = client.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![("AAPL".to_string(), ChartRange::OneYear)]);
}

#[tokio::test]
async fn batch_keeps_input_order_and_isolates_failures() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("AAPL", Script::Records(march_2021()))
            .with("BAD", Script::ApiError(500))
            .with("MSFT", Script::Records(march_2021())),
    );
    let mut settings = settings();
    settings
        .currencies
        .insert("BAD".to_string(), Currency::new("eur").unwrap());
    let source = source(client.clone(), &settings);
    let (from, to) = window(&settings);

    let series = source
        .get_symbols_data(&keys(&["AAPL", "BAD", "MSFT"]), from, to)
        .await;

    let names: Vec<_> = series.iter().map(|s| s.name()).collect();
    assert_eq!(names, ["AAPL", "BAD", "MSFT"]);
    assert_eq!(series[0].len(), 3);
    assert_eq!(series[2].len(), 3);

    let failed = &series[1];
    assert!(failed.is_empty());
    assert_eq!(failed.currency().code(), "EUR");
    assert_eq!(failed.period(), SamplingPeriod::Day);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn unknown_currency_falls_back() {
    let client = Arc::new(ScriptedClient::default().with("SAP", Script::ApiError(503)));
    let mut settings = settings();
    settings.fallback_currency = Currency::new("CHF").unwrap();
    let source = source(client, &settings);
    let (from, to) = window(&settings);

    let series = source.get_symbols_data(&keys(&["SAP"]), from, to).await;
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].currency().code(), "CHF");
}

#[tokio::test]
async fn batch_order_survives_out_of_order_completion() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("SLOW", Script::Delayed(60, march_2021()))
            .with("MID", Script::Delayed(30, march_2021()))
            .with("FAST", Script::Delayed(1, march_2021())),
    );
    let settings = settings();
    let source = source(client.clone(), &settings);
    let (from, to) = window(&settings);

    let series = source
        .get_symbols_data(&keys(&["SLOW", "MID", "FAST"]), from, to)
        .await;

    let names: Vec<_> = series.iter().map(|s| s.name()).collect();
    assert_eq!(names, ["SLOW", "MID", "FAST"]);
    assert!(client.max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn concurrency_of_one_is_sequential() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("A", Script::Delayed(5, march_2021()))
            .with("B", Script::Delayed(5, march_2021()))
            .with("C", Script::Delayed(5, march_2021())),
    );
    let settings = SourceSettings {
        max_concurrency: 1,
        ..settings()
    };
    let source = source(client.clone(), &settings);
    let (from, to) = window(&settings);

    let series = source.get_symbols_data(&keys(&["A", "B", "C"]), from, to).await;
    assert_eq!(series.len(), 3);
    assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_batch_makes_no_requests() {
    let client = Arc::new(ScriptedClient::default());
    let settings = settings();
    let source = source(client.clone(), &settings);
    let (from, to) = window(&settings);

    assert!(source.get_symbols_data(&[], from, to).await.is_empty());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn no_data_yields_empty_series() {
    let client = Arc::new(ScriptedClient::default().with("DELISTED", Script::NoData));
    let settings = settings();
    let source = source(client, &settings);
    let (from, to) = window(&settings);

    let series = source
        .get_symbol_data_in(&SymbolKey::new("DELISTED").unwrap(), from, to)
        .await
        .unwrap();
    assert!(series.is_empty());
    assert_eq!(series.name(), "DELISTED");
    assert_eq!(series.period(), SamplingPeriod::Day);
}

#[tokio::test]
async fn other_errors_propagate_from_single_fetch() {
    let client = Arc::new(ScriptedClient::default().with("AAPL", Script::ApiError(401)));
    let settings = settings();
    let source = source(client, &settings);
    let (from, to) = window(&settings);

    let err = source
        .get_symbol_data_in(&SymbolKey::new("AAPL").unwrap(), from, to)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::Api { status: 401, .. })
    ));
}

#[tokio::test]
async fn malformed_record_fails_single_fetch_but_not_batch() {
    let broken = vec![ChartRecord {
        date: "2021-03-15".to_string(),
        open: Some(SourceNumber::Text("n/a".to_string())),
        high: Some(SourceNumber::Number(1.0)),
        low: Some(SourceNumber::Number(1.0)),
        close: Some(SourceNumber::Number(1.0)),
        volume: Some(SourceNumber::Number(1.0)),
        ..ChartRecord::default()
    }];
    let client = Arc::new(
        ScriptedClient::default()
            .with("BROKEN", Script::Records(broken))
            .with("AAPL", Script::Records(march_2021())),
    );
    let settings = settings();
    let source = source(client, &settings);
    let (from, to) = window(&settings);

    let single = source
        .get_symbol_data_in(&SymbolKey::new("BROKEN").unwrap(), from, to)
        .await;
    assert!(matches!(single, Err(Error::Normalize(_))));

    let batch = source
        .get_symbols_data(&keys(&["BROKEN", "AAPL"]), from, to)
        .await;
    assert!(batch[0].is_empty());
    assert_eq!(batch[1].len(), 3);
}

#[tokio::test]
async fn bars_outside_the_window_are_dropped() {
    let client = Arc::new(ScriptedClient::default().with("AAPL", Script::Records(march_2021())));
    let settings = settings();
    let source = source(client, &settings);

    let from = Utc.with_ymd_and_hms(2021, 3, 16, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2021, 3, 17, 12, 0, 0).unwrap();
    let series = source
        .get_symbol_data_in(&SymbolKey::new("AAPL").unwrap(), from, to)
        .await
        .unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(
        series.bars()[0].timestamp,
        Utc.with_ymd_and_hms(2021, 3, 16, 12, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn settings_window_keeps_whole_local_days_far_east_of_utc() {
    let records = ["2021-03-14", "2021-03-15", "2021-03-16", "2021-03-17"]
        .iter()
        .map(|d| ChartRecord::daily(d, 1.0, 1.0, 1.0, 1.0, 1.0))
        .collect();
    let client = Arc::new(ScriptedClient::default().with("FPH", Script::Records(records)));
    let settings = SourceSettings {
        from: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
        to: NaiveDate::from_ymd_opt(2021, 3, 16).unwrap(),
        time_zone: Some("Pacific/Auckland".to_string()),
        ..settings()
    };
    let source = source(client, &settings);
    let (from, to) = window(&settings);

    let series = source
        .get_symbol_data_in(&SymbolKey::new("FPH").unwrap(), from, to)
        .await
        .unwrap();

    let zone = settings.bar_zone().unwrap();
    let days: Vec<String> = series
        .bars()
        .iter()
        .map(|b| zone.naive_local(b.timestamp).date().to_string())
        .collect();
    assert_eq!(days, ["2021-03-15", "2021-03-16"]);
}

#[tokio::test]
async fn all_history_fetch_keeps_every_bar() {
    let client = Arc::new(ScriptedClient::default().with("AAPL", Script::Records(march_2021())));
    let source = source(client, &settings());

    let series = source
        .get_symbol_data(&SymbolKey::new("AAPL").unwrap())
        .await
        .unwrap();
    assert_eq!(series.len(), 3);
}

#[tokio::test]
async fn range_table_and_overrides() {
    let client = Arc::new(ScriptedClient::default());
    let source = source(client.clone(), &settings());
    assert_eq!(source.range_to_period(ChartRange::Dynamic), SamplingPeriod::Minute);
    assert_eq!(source.range_to_period(ChartRange::Intraday), SamplingPeriod::Realtime);
    for range in [ChartRange::FiveYears, ChartRange::YearToDate, ChartRange::FiveDays] {
        assert_eq!(source.range_to_period(range), SamplingPeriod::Day);
    }

    let mut overridden = settings();
    overridden
        .period_overrides
        .insert("5y".to_string(), SamplingPeriod::Week);
    let source = IexDataSource::with_client(client, &overridden).unwrap();
    assert_eq!(source.range_to_period(ChartRange::FiveYears), SamplingPeriod::Week);
    assert_eq!(source.range_to_period(ChartRange::OneYear), SamplingPeriod::Day);
}

#[tokio::test]
async fn connect_is_idempotent() {
    let healthy = Arc::new(ScriptedClient::default().with("AAPL", Script::Records(march_2021())));
    let source = source(healthy.clone(), &settings());
    for _ in 0..3 {
        assert!(source.connect(&()).await);
        assert!(source.is_ready().await);
    }
    assert!(
        healthy
            .requests
            .lock()
            .unwrap()
            .iter()
            .all(|(symbol, range)| symbol == "AAPL" && *range == ChartRange::OneMonth)
    );

    let failing = Arc::new(ScriptedClient::default().with("AAPL", Script::ApiError(503)));
    let source = self::source(failing, &settings());
    for _ in 0..3 {
        assert!(!source.connect(&()).await);
        assert!(!source.is_ready().await);
    }
    source.disconnect().await;
}

#[tokio::test]
async fn connect_accepts_an_answer_without_data() {
    let client = Arc::new(ScriptedClient::default().with("AAPL", Script::NoData));
    let source = source(client.clone(), &settings());
    assert!(source.connect(&()).await);
    assert!(source.is_ready().await);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn symbol_listing_is_empty() {
    let source = source(Arc::new(ScriptedClient::default()), &settings());
    assert!(source.get_all_available_symbols().await.unwrap().is_empty());
}

#[test]
fn invalid_window_is_rejected_at_construction() {
    let settings = SourceSettings {
        from: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        to: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        ..settings()
    };
    let result = IexDataSource::with_client(Arc::new(ScriptedClient::default()), &settings);
    assert!(matches!(result, Err(Error::Settings(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn batch_returns_one_series_per_key(outcomes in proptest::collection::vec(0u8..3, 0..12)) {
        let mut client = ScriptedClient::default();
        let mut symbols = Vec::with_capacity(outcomes.len());
        for (i, outcome) in outcomes.iter().enumerate() {
            let symbol = format!("SYM{i}");
            let script = match outcome {
                0 => Script::Records(march_2021()),
                1 => Script::NoData,
                _ => Script::ApiError(500),
            };
            client = client.with(&symbol, script);
            symbols.push(symbol);
        }
        let client = Arc::new(client);
        let settings = settings();
        let source = source(client.clone(), &settings);
        let (from, to) = window(&settings);
        let keys: Vec<SymbolKey> = symbols.iter().map(|s| SymbolKey::new(s.as_str()).unwrap()).collect();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let series = runtime.block_on(source.get_symbols_data(&keys, from, to));

        prop_assert_eq!(series.len(), keys.len());
        prop_assert_eq!(client.calls(), keys.len());
        for ((s, symbol), outcome) in series.iter().zip(&symbols).zip(&outcomes) {
            prop_assert_eq!(s.name(), symbol.as_str());
            prop_assert_eq!(s.is_empty(), *outcome != 0);
        }
    }
}
