//! 일봉 시세 제공자.
//!
//! 스크리너는 `PriceHistoryProvider` trait만 알고 있으며, 실제 구현은
//! 실행 시점에 주입됩니다. 테스트에서는 가짜 제공자로 대체합니다.

mod yahoo;

pub use yahoo::YahooChartProvider;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use turtle_core::PriceBar;

use crate::error::DataError;

/// 조회 기간 (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `end`로부터 `days`일(달력 기준) 이전까지의 기간.
    pub fn lookback(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }
}

/// 일봉 시세 제공자.
///
/// 존재하지 않는 종목은 오류가 아니라 빈 목록으로 응답합니다.
/// 반환되는 일봉의 날짜 순서는 보장되지 않으며 수집기가 검증합니다.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 한 종목의 일봉을 조회합니다.
    async fn fetch_history(
        &self,
        ticker: &str,
        range: DateRange,
    ) -> Result<Vec<PriceBar>, DataError>;

    /// 여러 종목을 한 번에 조회합니다.
    ///
    /// 기본 구현은 종목별로 순차 조회합니다. 결과는 입력 순서를 따릅니다.
    async fn fetch_batch(
        &self,
        tickers: &[String],
        range: DateRange,
    ) -> Vec<(String, Result<Vec<PriceBar>, DataError>)> {
        let mut results = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let result = self.fetch_history(ticker, range).await;
            results.push((ticker.clone(), result));
        }
        results
    }
}
