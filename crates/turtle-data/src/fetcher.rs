//! 배치 단위 시세 수집.
//!
//! 종목 목록을 고정 크기 배치로 나누어 제공자에 요청하고, 일시적 오류는
//! 종목별로 재시도합니다. 한 종목의 실패가 배치나 실행 전체를 중단시키지 않습니다.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use turtle_core::{FetchConfig, PriceBar, PriceSeries};

use crate::error::DataError;
use crate::provider::{DateRange, PriceHistoryProvider};
use crate::retry::RetryPolicy;

/// 재시도 후에도 수집하지 못한 종목.
#[derive(Debug)]
pub struct FetchFailure {
    pub ticker: String,
    /// 실제 시도 횟수
    pub attempts: u32,
    pub error: DataError,
}

/// 수집 결과.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// 최소 일봉 수를 충족한 종목의 시계열
    pub series: HashMap<String, PriceSeries>,
    /// 수집 실패 종목
    pub errors: Vec<FetchFailure>,
    /// 데이터 부족으로 제외된 종목 (오류 아님)
    pub insufficient: Vec<String>,
}

impl FetchOutcome {
    /// 실패한 티커 목록.
    pub fn error_tickers(&self) -> Vec<String> {
        self.errors.iter().map(|f| f.ticker.clone()).collect()
    }
}

/// 한 종목의 최종 수집 상태.
enum Resolved {
    Ready(PriceSeries),
    Insufficient(usize),
    Failed(FetchFailure),
}

/// 배치 수집기.
pub struct BatchFetcher {
    provider: Arc<dyn PriceHistoryProvider>,
    policy: RetryPolicy,
    batch_size: usize,
    batch_delay: Duration,
    lookback_days: u32,
    min_bars: usize,
}

impl BatchFetcher {
    /// 수집 설정으로 생성합니다.
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: &FetchConfig) -> Self {
        Self {
            provider,
            policy: RetryPolicy::from_config(config),
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            lookback_days: config.lookback_days,
            min_bars: config.min_bars,
        }
    }

    /// 재시도 정책을 교체합니다.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `end`를 기준으로 조회 기간을 계산합니다.
    pub fn range_ending(&self, end: NaiveDate) -> DateRange {
        DateRange::lookback(end, self.lookback_days)
    }

    /// 전체 종목을 배치 단위로 수집합니다.
    pub async fn fetch(&self, tickers: &[String], end: NaiveDate) -> FetchOutcome {
        let range = self.range_ending(end);
        let mut outcome = FetchOutcome::default();

        let total_batches = tickers.len().div_ceil(self.batch_size);

        for (idx, batch) in tickers.chunks(self.batch_size).enumerate() {
            tracing::info!(
                provider = self.provider.name(),
                batch = format!("{}/{}", idx + 1, total_batches),
                size = batch.len(),
                "배치 수집 시작"
            );

            let mut first_attempts = self.provider.fetch_batch(batch, range).await;

            let answered: HashSet<&str> = first_attempts.iter().map(|(t, _)| t.as_str()).collect();
            let missing: Vec<String> = batch
                .iter()
                .filter(|t| !answered.contains(t.as_str()))
                .cloned()
                .collect();
            first_attempts.extend(missing.into_iter().map(|t| {
                let err = DataError::MissingResponse(t.clone());
                (t, Err(err))
            }));

            for (ticker, first) in first_attempts {
                match self.resolve(&ticker, range, first).await {
                    Resolved::Ready(series) => {
                        outcome.series.insert(ticker, series);
                    }
                    Resolved::Insufficient(bars) => {
                        tracing::debug!(ticker = %ticker, bars, min = self.min_bars, "데이터 부족");
                        outcome.insufficient.push(ticker);
                    }
                    Resolved::Failed(failure) => outcome.errors.push(failure),
                }
            }

            if idx + 1 < total_batches && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        tracing::info!(
            requested = tickers.len(),
            fetched = outcome.series.len(),
            insufficient = outcome.insufficient.len(),
            errors = outcome.errors.len(),
            "시세 수집 완료"
        );

        outcome
    }

    /// 한 종목만 수집합니다. 데이터가 부족하면 `Ok(None)`.
    pub async fn fetch_one(
        &self,
        ticker: &str,
        end: NaiveDate,
    ) -> Result<Option<PriceSeries>, DataError> {
        let range = self.range_ending(end);
        let first = self.provider.fetch_history(ticker, range).await;

        match self.resolve(ticker, range, first).await {
            Resolved::Ready(series) => Ok(Some(series)),
            Resolved::Insufficient(_) => Ok(None),
            Resolved::Failed(failure) => Err(failure.error),
        }
    }

    /// 첫 시도 결과를 받아 필요하면 재시도하고 최종 상태를 결정합니다.
    async fn resolve(
        &self,
        ticker: &str,
        range: DateRange,
        first: Result<Vec<PriceBar>, DataError>,
    ) -> Resolved {
        let mut attempt = 1;
        let mut result = first;

        loop {
            match result {
                Ok(bars) => return self.classify(ticker, attempt, bars),
                Err(e) if e.is_retryable() && self.policy.should_retry(attempt) => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        ticker,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "수집 실패, 재시도"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    result = self.provider.fetch_history(ticker, range).await;
                }
                Err(e) => {
                    tracing::error!(ticker, attempts = attempt, error = %e, "수집 최종 실패");
                    return Resolved::Failed(FetchFailure {
                        ticker: ticker.to_string(),
                        attempts: attempt,
                        error: e,
                    });
                }
            }
        }
    }

    fn classify(&self, ticker: &str, attempts: u32, bars: Vec<PriceBar>) -> Resolved {
        if bars.len() < self.min_bars {
            return Resolved::Insufficient(bars.len());
        }

        match PriceSeries::new(ticker, bars) {
            Ok(series) => Resolved::Ready(series),
            Err(e) => {
                tracing::error!(ticker, error = %e, "잘못된 시계열");
                Resolved::Failed(FetchFailure {
                    ticker: ticker.to_string(),
                    attempts,
                    error: e.into(),
                })
            }
        }
    }
}
