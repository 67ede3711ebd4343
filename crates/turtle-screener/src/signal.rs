//! 터틀 트레이딩 신호 판정.
//!
//! 최신 일봉의 종가만으로 신호 상태를 결정합니다.
//!
//! - 시그널 1 (20/10일): 종가 > 직전 20일 최고가 → 매수 진입 (청산 기준: 직전 10일 최저가),
//!   그렇지 않고 종가 < 직전 20일 최저가 → 매도 이탈
//! - 시그널 2 (55/20일): 종가 > 직전 55일 최고가 → 매수 진입 (청산 기준: 직전 20일 최저가)
//!
//! 비교는 모두 엄격한 부등호이며, 레벨과 같은 종가는 신호가 아닙니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use turtle_core::{Market, Price, PriceSeries, StrategyConfig};

use crate::error::SignalError;
use crate::levels::{ChannelLevels, LevelSnapshot};

/// 매매 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// 돌파 진입 신호.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySignal {
    #[serde(rename = "type")]
    pub side: Side,
    /// 신호 발생 종가
    pub price: Price,
    /// 돌파한 레벨
    pub breakout_level: Price,
    pub date: NaiveDate,
    /// 청산 기준 레벨
    pub exit_level: Price,
}

impl EntrySignal {
    fn buy(price: Price, breakout_level: Price, date: NaiveDate, exit_level: Price) -> Self {
        Self {
            side: Side::Buy,
            price,
            breakout_level,
            date,
            exit_level,
        }
    }
}

/// 이탈 청산 신호.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitSignal {
    #[serde(rename = "type")]
    pub side: Side,
    pub price: Price,
    /// 하향 이탈한 레벨
    pub breakdown_level: Price,
    pub date: NaiveDate,
}

/// 시그널 1 슬롯. 진입과 이탈은 동시에 존재할 수 없습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChannelSignal {
    #[default]
    None,
    Entry(EntrySignal),
    Exit(ExitSignal),
}

impl ChannelSignal {
    pub fn entry(&self) -> Option<&EntrySignal> {
        match self {
            ChannelSignal::Entry(e) => Some(e),
            _ => None,
        }
    }

    pub fn exit(&self) -> Option<&ExitSignal> {
        match self {
            ChannelSignal::Exit(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, ChannelSignal::None)
    }
}

/// `{"entry": ..., "exit": ...}` 형태로 직렬화합니다. 비어 있는 쪽은 `null`입니다.
impl Serialize for ChannelSignal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChannelSignal", 2)?;
        state.serialize_field("entry", &self.entry())?;
        state.serialize_field("exit", &self.exit())?;
        state.end()
    }
}

/// 한 종목의 최신 일봉 평가 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalResult {
    pub ticker: String,
    pub name: String,
    pub market: Market,
    /// 평가한 일봉의 날짜
    pub date: NaiveDate,
    /// 종가
    pub price: Price,
    pub volume: u64,
    /// 평균 거래량 (기본 20일, 당일 포함)
    pub volume_avg: Option<Decimal>,
    pub levels: LevelSnapshot,
    pub signal1: ChannelSignal,
    pub signal2: Option<EntrySignal>,
}

impl SignalResult {
    /// 신호가 하나라도 있는지 확인.
    pub fn has_signal(&self) -> bool {
        self.signal1.is_active() || self.signal2.is_some()
    }
}

/// 신호 계산기.
#[derive(Debug, Clone, Default)]
pub struct SignalCalculator {
    config: StrategyConfig,
}

impl SignalCalculator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// 평가에 필요한 최소 일봉 수.
    pub fn min_bars(&self) -> usize {
        self.config.min_required_bars()
    }

    /// 최신 일봉 기준으로 신호를 평가합니다.
    ///
    /// 일봉이 부족하면 `Ok(None)`을 반환합니다.
    pub fn evaluate(
        &self,
        ticker: &str,
        name: &str,
        market: Market,
        series: &PriceSeries,
    ) -> Result<Option<SignalResult>, SignalError> {
        if series.len() < self.min_bars() {
            return Ok(None);
        }
        let Some(bar) = series.latest() else {
            return Ok(None);
        };

        let levels = ChannelLevels::compute(series, &self.config)?;
        let Some(snapshot) = levels.latest() else {
            return Ok(None);
        };

        let close = bar.close;
        let date = bar.date;

        let signal1 = match (snapshot.entry_high, snapshot.entry_low, snapshot.exit_low) {
            (Some(high), Some(low), Some(exit_low)) => {
                if close > high {
                    ChannelSignal::Entry(EntrySignal::buy(close, high, date, exit_low))
                } else if close < low {
                    ChannelSignal::Exit(ExitSignal {
                        side: Side::Sell,
                        price: close,
                        breakdown_level: low,
                        date,
                    })
                } else {
                    ChannelSignal::None
                }
            }
            _ => ChannelSignal::None,
        };

        let signal2 = match (snapshot.long_entry_high, snapshot.long_exit_low) {
            (Some(high), Some(exit_low)) if close > high => {
                Some(EntrySignal::buy(close, high, date, exit_low))
            }
            _ => None,
        };

        Ok(Some(SignalResult {
            ticker: ticker.to_string(),
            name: name.to_string(),
            market,
            date,
            price: close,
            volume: bar.volume,
            volume_avg: snapshot.volume_avg,
            levels: snapshot,
            signal1,
            signal2,
        }))
    }
}
