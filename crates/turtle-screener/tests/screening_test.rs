//! 스크리닝 파이프라인 통합 테스트.
//!
//! 고정된 시계열을 돌려주는 가짜 제공자로 수집부터 결과 문서까지 전체 흐름을 검증합니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use turtle_core::{PriceBar, ScreenerConfig};
use turtle_data::{DataError, DateRange, PriceHistoryProvider, TickerUniverse};
use turtle_screener::{ScreenReport, ScreeningOrchestrator, Side};

struct FixtureProvider {
    bars: HashMap<String, Vec<PriceBar>>,
    broken: Vec<String>,
    calls: AtomicUsize,
}

impl FixtureProvider {
    fn new() -> Self {
        Self {
            bars: HashMap::new(),
            broken: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn with(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    fn with_broken(mut self, ticker: &str) -> Self {
        self.broken.push(ticker.to_string());
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        _range: DateRange,
    ) -> Result<Vec<PriceBar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.iter().any(|t| t == ticker) {
            return Err(DataError::Parse("malformed response".into()));
        }
        Ok(self.bars.get(ticker).cloned().unwrap_or_default())
    }
}

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
}

/// 70개 일봉. 앞 69개는 5700~5900 사이에서 움직이고 마지막 날 종가 6000으로 돌파합니다.
fn breakout_series(volume: u64) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = (0..69)
        .map(|i| {
            let high = Decimal::from(5700 + ((i * 37) % 11) * 20);
            let low = high - dec!(150);
            PriceBar::new(day(i), low + dec!(50), high, low, high - dec!(30), volume)
        })
        .collect();
    bars.push(PriceBar::new(
        day(69),
        dec!(5950),
        dec!(6010),
        dec!(5940),
        dec!(6000),
        volume,
    ));
    bars
}

/// `price - 1`로 횡보하다 마지막 날 `price`로 마감하는 60개 일봉.
fn simple_breakout(price: i64, volume: u64) -> Vec<PriceBar> {
    let base = Decimal::from(price - 1);
    let last = Decimal::from(price);
    let mut bars: Vec<PriceBar> = (0..59)
        .map(|i| PriceBar::new(day(i), base, base, base, base, volume))
        .collect();
    bars.push(PriceBar::new(day(59), last, last, last, last, volume));
    bars
}

fn config() -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    config.fetch.batch_delay_ms = 0;
    config.fetch.retry_delay_ms = 0;
    config
}

fn as_of() -> NaiveDate {
    day(69)
}

#[tokio::test]
async fn test_scenario_a_krx_breakout_is_reported() {
    let bars = breakout_series(150_000);
    let expected_breakout = bars[49..69].iter().map(|b| b.high).max().unwrap();
    let expected_exit = bars[59..69].iter().map(|b| b.low).min().unwrap();

    let provider = Arc::new(FixtureProvider::new().with("005930.KS", bars));
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(["005930"], Vec::<&str>::new());

    let summary = orchestrator.run_as_of(&universe, as_of()).await;

    assert_eq!(summary.total_analyzed, 1);
    assert_eq!(summary.krx_with_signals, 1);
    assert_eq!(summary.results.len(), 1);

    let result = &summary.results[0];
    let entry = result.signal1.entry().expect("signal1 entry");
    assert_eq!(entry.side, Side::Buy);
    assert_eq!(entry.price, dec!(6000));
    assert_eq!(entry.breakout_level, expected_breakout);
    assert_eq!(entry.exit_level, expected_exit);
    assert_eq!(result.volume_avg, Some(dec!(150000)));

    let report = ScreenReport::from_summary(&summary);
    let json = serde_json::to_value(&report).unwrap();
    let stock = &json["filtered_stocks"][0];
    assert_eq!(stock["ticker"], "005930.KS");
    assert_eq!(stock["market"], "KRX");
    assert_eq!(stock["signals"]["signal1"]["entry"]["type"], "BUY");
    assert_eq!(stock["volume_20_avg"], 150000);
}

#[tokio::test]
async fn test_scenario_b_low_volume_is_excluded() {
    let provider = Arc::new(FixtureProvider::new().with("005930.KS", breakout_series(50_000)));
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(["005930"], Vec::<&str>::new());

    let summary = orchestrator.run_as_of(&universe, as_of()).await;

    assert_eq!(summary.total_analyzed, 1);
    assert!(summary.results.is_empty());
    assert!(summary.errors.is_empty());
    assert_eq!(summary.krx_with_signals, 0);
}

#[tokio::test]
async fn test_scenario_c_empty_universe() {
    let provider = Arc::new(FixtureProvider::new());
    let orchestrator = ScreeningOrchestrator::from_config(provider.clone(), &config());

    let summary = orchestrator
        .run_as_of(&TickerUniverse::default(), as_of())
        .await;

    assert_eq!(summary.total_analyzed, 0);
    assert_eq!(summary.krx_analyzed, 0);
    assert_eq!(summary.us_analyzed, 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert!(summary.processing_time.is_zero());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    let json = serde_json::to_value(ScreenReport::from_summary(&summary)).unwrap();
    assert_eq!(json["filtered_stocks"], serde_json::json!([]));
    assert_eq!(json["metadata"]["total_signals_found"], 0);
}

#[tokio::test]
async fn test_results_sorted_by_price_descending() {
    let provider = Arc::new(
        FixtureProvider::new()
            .with("AAA", simple_breakout(10, 300_000))
            .with("BBB", simple_breakout(30, 300_000))
            .with("CCC", simple_breakout(20, 300_000)),
    );
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(Vec::<&str>::new(), ["AAA", "BBB", "CCC"]);

    let summary = orchestrator.run_as_of(&universe, day(59)).await;

    let prices: Vec<Decimal> = summary.results.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![dec!(30), dec!(20), dec!(10)]);
    assert_eq!(summary.us_with_signals, 3);
    assert_eq!(summary.signal_breakdown.signal1_count, 3);
    assert_eq!(summary.signal_breakdown.signal2_count, 3);
}

#[tokio::test]
async fn test_equal_prices_keep_encounter_order() {
    let provider = Arc::new(
        FixtureProvider::new()
            .with("ZZZ", simple_breakout(20, 300_000))
            .with("AAA", simple_breakout(20, 300_000)),
    );
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(Vec::<&str>::new(), ["ZZZ", "AAA"]);

    let summary = orchestrator.run_as_of(&universe, day(59)).await;

    let tickers: Vec<&str> = summary.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["ZZZ", "AAA"]);
}

#[tokio::test]
async fn test_mixed_universe_counts_and_errors() {
    let provider = Arc::new(
        FixtureProvider::new()
            .with("005930.KS", breakout_series(150_000))
            .with("AAPL", simple_breakout(200, 1_000_000))
            .with("PENNY", simple_breakout(3, 1_000_000))
            .with("NEW", simple_breakout(50, 1_000_000)[..40].to_vec())
            .with_broken("BROKEN"),
    );
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe =
        TickerUniverse::from_tickers(["005930"], ["AAPL", "PENNY", "NEW", "BROKEN"]);

    let summary = orchestrator.run_as_of(&universe, as_of()).await;

    assert_eq!(summary.total_analyzed, 5);
    assert_eq!(
        summary.total_analyzed,
        summary.krx_analyzed + summary.us_analyzed
    );
    assert_eq!(summary.krx_with_signals, 1);
    assert_eq!(summary.us_with_signals, 1);
    assert_eq!(summary.errors, vec!["BROKEN".to_string()]);
    assert_eq!(summary.insufficient, vec!["NEW".to_string()]);
    assert_eq!(summary.success_rate(), 80.0);

    // 결과에 포함된 종목은 모두 필터를 통과해야 함
    for result in &summary.results {
        assert!(orchestrator.filter().accepts(result));
    }

    let tickers: Vec<&str> = summary.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["005930.KS", "AAPL"]);
}

#[tokio::test]
async fn test_ticker_listed_in_both_markets_is_analyzed_once() {
    let provider = Arc::new(FixtureProvider::new().with("AAPL", simple_breakout(6000, 1_000_000)));
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(["AAPL"], ["AAPL"]);

    let summary = orchestrator.run_as_of(&universe, day(59)).await;

    assert_eq!(summary.total_analyzed, 1);
    assert_eq!(summary.krx_analyzed, 1);
    assert_eq!(summary.us_analyzed, 0);
    assert_eq!(summary.krx_with_signals, 1);
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.success_rate(), 100.0);
}

#[tokio::test]
async fn test_krx_price_boundary() {
    let at_floor = simple_breakout(5000, 100_000);
    let below_floor: Vec<PriceBar> = at_floor
        .iter()
        .map(|b| {
            let mut b = b.clone();
            b.close -= dec!(0.01);
            b.high -= dec!(0.01);
            b.low -= dec!(0.01);
            b
        })
        .collect();

    let provider = Arc::new(
        FixtureProvider::new()
            .with("000001.KS", at_floor)
            .with("000002.KS", below_floor),
    );
    let orchestrator = ScreeningOrchestrator::from_config(provider, &config());
    let universe = TickerUniverse::from_tickers(["000001", "000002"], Vec::<&str>::new());

    let summary = orchestrator.run_as_of(&universe, day(59)).await;

    let tickers: Vec<&str> = summary.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["000001.KS"]);
}
