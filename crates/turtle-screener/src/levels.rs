//! 터틀 채널 레벨 계산.
//!
//! 돌파/이탈 레벨은 모두 **1일 지연** 롤링 윈도우입니다. `i`번째 일봉의 레벨은
//! `i - window .. i` 구간(당일 제외)의 최고가/최저가이며, 윈도우가 차기 전에는 `None`입니다.
//! 평균 거래량만 당일을 포함한 윈도우를 사용합니다.

use std::collections::VecDeque;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use turtle_core::{Price, PriceSeries, StrategyConfig};

use crate::error::SignalError;

/// 1일 지연 롤링 최고값.
///
/// `out[i] = max(values[i - window .. i])`, `i < window`이면 `None`.
pub fn rolling_max_lagged<T: Ord + Copy>(values: &[T], window: usize) -> Vec<Option<T>> {
    lagged_extreme(values, window, |candidate, kept| candidate >= kept)
}

/// 1일 지연 롤링 최저값.
///
/// `out[i] = min(values[i - window .. i])`, `i < window`이면 `None`.
pub fn rolling_min_lagged<T: Ord + Copy>(values: &[T], window: usize) -> Vec<Option<T>> {
    lagged_extreme(values, window, |candidate, kept| candidate <= kept)
}

/// 단조 덱으로 O(n)에 지연 윈도우 극값을 구합니다.
///
/// `dominates(a, b)`가 참이면 `b`는 `a`가 윈도우에 있는 동안 극값이 될 수 없습니다.
fn lagged_extreme<T, F>(values: &[T], window: usize, dominates: F) -> Vec<Option<T>>
where
    T: Copy,
    F: Fn(&T, &T) -> bool,
{
    let mut out = Vec::with_capacity(values.len());
    if window == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window + 1);

    for (i, value) in values.iter().enumerate() {
        while deque.front().is_some_and(|&j| j + window < i) {
            deque.pop_front();
        }

        out.push(if i >= window {
            deque.front().map(|&j| values[j])
        } else {
            None
        });

        while deque.back().is_some_and(|&j| dominates(value, &values[j])) {
            deque.pop_back();
        }
        deque.push_back(i);
    }

    out
}

/// 당일 포함 롤링 평균 거래량.
///
/// 합계를 Decimal로 표현할 수 없으면 `None`을 반환합니다.
pub fn rolling_mean(values: &[u64], window: usize) -> Option<Vec<Option<Decimal>>> {
    if window == 0 {
        return Some(vec![None; values.len()]);
    }

    let divisor = Decimal::from(window as u64);
    let mut out = Vec::with_capacity(values.len());
    let mut sum: u128 = 0;

    for (i, &v) in values.iter().enumerate() {
        sum += u128::from(v);
        if i >= window {
            sum -= u128::from(values[i - window]);
        }

        if i + 1 >= window {
            let mean = Decimal::from_u128(sum)?.checked_div(divisor)?;
            out.push(Some(mean));
        } else {
            out.push(None);
        }
    }

    Some(out)
}

/// 특정 일봉 시점의 레벨 묶음.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    /// 시그널 1 진입 기준: 직전 `entry_period`일 최고가
    pub entry_high: Option<Price>,
    /// 시그널 1 이탈 기준: 직전 `entry_period`일 최저가
    pub entry_low: Option<Price>,
    /// 시그널 1 청산 기준: 직전 `exit_period`일 최저가
    pub exit_low: Option<Price>,
    /// 시그널 2 진입 기준: 직전 `long_entry_period`일 최고가
    pub long_entry_high: Option<Price>,
    /// 시그널 2 청산 기준: 직전 `long_exit_period`일 최저가
    pub long_exit_low: Option<Price>,
    /// 당일 포함 평균 거래량
    pub volume_avg: Option<Decimal>,
}

/// 시계열 전체에 대한 일봉별 채널 레벨.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLevels {
    entry_high: Vec<Option<Price>>,
    entry_low: Vec<Option<Price>>,
    exit_low: Vec<Option<Price>>,
    long_entry_high: Vec<Option<Price>>,
    long_exit_low: Vec<Option<Price>>,
    volume_avg: Vec<Option<Decimal>>,
}

impl ChannelLevels {
    /// 시계열에서 모든 레벨을 계산합니다.
    pub fn compute(series: &PriceSeries, config: &StrategyConfig) -> Result<Self, SignalError> {
        let highs = series.highs();
        let lows = series.lows();

        let volume_avg = rolling_mean(&series.volumes(), config.volume_avg_period)
            .ok_or_else(|| SignalError::calculation(series.ticker(), "평균 거래량 오버플로"))?;

        Ok(Self {
            entry_high: rolling_max_lagged(&highs, config.entry_period),
            entry_low: rolling_min_lagged(&lows, config.entry_period),
            exit_low: rolling_min_lagged(&lows, config.exit_period),
            long_entry_high: rolling_max_lagged(&highs, config.long_entry_period),
            long_exit_low: rolling_min_lagged(&lows, config.long_exit_period),
            volume_avg,
        })
    }

    pub fn len(&self) -> usize {
        self.entry_high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_high.is_empty()
    }

    /// `index`번째 일봉의 레벨.
    pub fn at(&self, index: usize) -> Option<LevelSnapshot> {
        if index >= self.len() {
            return None;
        }
        Some(LevelSnapshot {
            entry_high: self.entry_high[index],
            entry_low: self.entry_low[index],
            exit_low: self.exit_low[index],
            long_entry_high: self.long_entry_high[index],
            long_exit_low: self.long_exit_low[index],
            volume_avg: self.volume_avg[index],
        })
    }

    /// 최신 일봉의 레벨.
    pub fn latest(&self) -> Option<LevelSnapshot> {
        self.len().checked_sub(1).and_then(|i| self.at(i))
    }
}
