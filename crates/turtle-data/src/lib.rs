//! 시세 데이터 수집 및 종목 유니버스.
//!
//! 이 crate는 다음을 제공합니다:
//! - `PriceHistoryProvider` - 일봉 시세 제공자 trait
//! - `YahooChartProvider` - Yahoo Finance 차트 API 구현
//! - `BatchFetcher` - 배치 단위 수집, 재시도, 데이터 부족 종목 제외
//! - `TickerUniverse` - KRX/US 종목 목록 로드 및 정규화

pub mod error;
pub mod fetcher;
pub mod provider;
pub mod retry;
pub mod universe;

pub use error::DataError;
pub use fetcher::{BatchFetcher, FetchFailure, FetchOutcome};
pub use provider::{DateRange, PriceHistoryProvider, YahooChartProvider};
pub use retry::{Backoff, RetryPolicy};
pub use universe::{TickerUniverse, UniverseEntry};
