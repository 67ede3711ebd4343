//! 일봉 및 가격 시계열.
//!
//! - `PriceBar` - 하루치 OHLCV 데이터
//! - `PriceSeries` - 날짜 오름차순으로 정렬된 한 종목의 일봉 목록

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Price;
use crate::error::{CoreError, CoreResult};

/// 하루치 OHLCV 데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (주)
    pub volume: u64,
}

impl PriceBar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 한 종목의 일봉 시계열.
///
/// 날짜는 항상 엄격하게 증가합니다. 휴장일은 단순히 빠져 있을 뿐 빈 칸으로 채우지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 이미 날짜순으로 정렬된 일봉으로 시계열을 생성합니다.
    ///
    /// 날짜가 중복되거나 역순이면 `CoreError::InvalidSeries`를 반환합니다.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> CoreResult<Self> {
        let ticker = ticker.into();

        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(CoreError::invalid_series(
                ticker,
                format!(
                    "날짜가 증가하지 않음: {} 다음 {}",
                    pair[0].date, pair[1].date
                ),
            ));
        }

        Ok(Self { ticker, bars })
    }

    /// 티커.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// 일봉 개수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 가장 최근 일봉.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// 고가 열.
    pub fn highs(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// 저가 열.
    pub fn lows(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// 거래량 열.
    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}
