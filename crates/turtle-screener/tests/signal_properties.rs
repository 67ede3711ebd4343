//! 신호 계산 속성 테스트.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use turtle_core::{Market, PriceBar, PriceSeries, StrategyConfig};
use turtle_screener::{ChannelLevels, SignalCalculator};

fn series_from(rows: &[(i64, i64, u64)]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, &(low, spread, volume))| {
            let low = Decimal::new(low, 2);
            let high = low + Decimal::new(spread, 2);
            PriceBar::new(
                start + Duration::days(i as i64),
                low,
                high,
                low,
                (low + high) / Decimal::TWO,
                volume,
            )
        })
        .collect();
    PriceSeries::new("PROP", bars).unwrap()
}

fn rows(min: usize, max: usize) -> impl Strategy<Value = Vec<(i64, i64, u64)>> {
    prop::collection::vec((100..100_000i64, 0..5_000i64, 0..10_000_000u64), min..max)
}

proptest! {
    /// d일 일봉의 고가/저가를 바꿔도 d일(및 그 이전)의 레벨은 변하지 않는다.
    #[test]
    fn prop_levels_never_look_ahead(
        data in rows(60, 120),
        pick in any::<prop::sample::Index>(),
        new_low in 100..100_000i64,
        new_spread in 0..5_000i64,
    ) {
        let config = StrategyConfig::default();
        let d = pick.index(data.len());

        let original = ChannelLevels::compute(&series_from(&data), &config).unwrap();

        let mut mutated_rows = data.clone();
        mutated_rows[d].0 = new_low;
        mutated_rows[d].1 = new_spread;
        let mutated = ChannelLevels::compute(&series_from(&mutated_rows), &config).unwrap();

        for i in 0..=d {
            let (a, b) = (original.at(i).unwrap(), mutated.at(i).unwrap());
            prop_assert_eq!(a.entry_high, b.entry_high);
            prop_assert_eq!(a.entry_low, b.entry_low);
            prop_assert_eq!(a.exit_low, b.exit_low);
            prop_assert_eq!(a.long_entry_high, b.long_entry_high);
            prop_assert_eq!(a.long_exit_low, b.long_exit_low);
        }
    }

    /// 같은 시계열을 두 번 평가하면 결과가 같다.
    #[test]
    fn prop_evaluation_is_idempotent(data in rows(56, 100)) {
        let series = series_from(&data);
        let calculator = SignalCalculator::default();

        let first = calculator.evaluate("PROP", "Prop", Market::Us, &series).unwrap();
        let second = calculator.evaluate("PROP", "Prop", Market::Us, &series).unwrap();

        prop_assert!(first.is_some());
        prop_assert_eq!(first, second);
    }

    /// 시그널 결과는 최신 종가와 레벨의 엄격한 비교와 일치한다.
    #[test]
    fn prop_signals_match_strict_comparisons(data in rows(56, 100)) {
        let series = series_from(&data);
        let result = SignalCalculator::default()
            .evaluate("PROP", "Prop", Market::Us, &series)
            .unwrap()
            .unwrap();

        let close = result.price;
        let levels = result.levels;
        let high = levels.entry_high.unwrap();
        let low = levels.entry_low.unwrap();

        prop_assert_eq!(result.signal1.entry().is_some(), close > high);
        prop_assert_eq!(result.signal1.exit().is_some(), close <= high && close < low);
        prop_assert!(!(result.signal1.entry().is_some() && result.signal1.exit().is_some()));
        prop_assert_eq!(result.signal2.is_some(), close > levels.long_entry_high.unwrap());
    }
}

#[test]
fn test_series_of_55_bars_is_not_evaluated() {
    let data: Vec<(i64, i64, u64)> = (0..55).map(|i| (1_000 + i, 100, 1_000)).collect();
    let series = series_from(&data);
    let result = SignalCalculator::default()
        .evaluate("PROP", "Prop", Market::Us, &series)
        .unwrap();
    assert!(result.is_none());
}
