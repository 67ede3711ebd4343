//! 스크리닝 오케스트레이터.
//!
//! 수집(BatchFetcher) → 신호 계산(SignalCalculator) → 필터(EligibilityFilter) →
//! 집계(ScreenSummary) 순서로 전체 유니버스를 처리합니다.
//! 종목 단위 실패는 오류 목록에 기록될 뿐 실행을 중단시키지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use turtle_core::{Market, ScreenerConfig};
use turtle_data::{BatchFetcher, PriceHistoryProvider, TickerUniverse};

use crate::filter::{Eligibility, EligibilityFilter};
use crate::signal::SignalCalculator;
use crate::summary::{ScreenSummary, SignalBreakdown};

/// 스크리닝 파이프라인.
pub struct ScreeningOrchestrator {
    fetcher: BatchFetcher,
    calculator: SignalCalculator,
    filter: EligibilityFilter,
}

impl ScreeningOrchestrator {
    pub fn new(
        fetcher: BatchFetcher,
        calculator: SignalCalculator,
        filter: EligibilityFilter,
    ) -> Self {
        Self {
            fetcher,
            calculator,
            filter,
        }
    }

    /// 설정과 시세 제공자로 파이프라인을 구성합니다.
    pub fn from_config(provider: Arc<dyn PriceHistoryProvider>, config: &ScreenerConfig) -> Self {
        Self::new(
            BatchFetcher::new(provider, &config.fetch),
            SignalCalculator::new(config.strategy.clone()),
            EligibilityFilter::new(config.filters.clone()),
        )
    }

    pub fn filter(&self) -> &EligibilityFilter {
        &self.filter
    }

    /// 오늘(UTC)을 기준일로 스크리닝을 실행합니다.
    pub async fn run(&self, universe: &TickerUniverse) -> ScreenSummary {
        self.run_as_of(universe, Utc::now().date_naive()).await
    }

    /// `end`를 조회 기간의 마지막 날로 스크리닝을 실행합니다.
    pub async fn run_as_of(&self, universe: &TickerUniverse, end: NaiveDate) -> ScreenSummary {
        let started = Instant::now();

        if universe.is_empty() {
            tracing::warn!("스크리닝할 종목이 없습니다");
            return ScreenSummary::empty(Utc::now());
        }

        let krx_analyzed = universe.krx().len();
        let us_analyzed = universe.us().len();

        tracing::info!(
            krx = krx_analyzed,
            us = us_analyzed,
            end_date = %end,
            "스크리닝 시작"
        );

        let tickers: Vec<String> = universe.entries().map(|e| e.ticker.clone()).collect();
        let mut outcome = self.fetcher.fetch(&tickers, end).await;

        let mut errors = outcome.error_tickers();
        let mut insufficient = std::mem::take(&mut outcome.insufficient);
        let mut results = Vec::new();
        let mut krx_with_signals = 0;
        let mut us_with_signals = 0;

        for entry in universe.entries() {
            let Some(series) = outcome.series.remove(&entry.ticker) else {
                continue;
            };

            match self
                .calculator
                .evaluate(&entry.ticker, &entry.name, entry.market, &series)
            {
                Ok(Some(result)) => match self.filter.check(&result) {
                    Eligibility::Accepted => {
                        match entry.market {
                            Market::Krx => krx_with_signals += 1,
                            Market::Us => us_with_signals += 1,
                        }
                        tracing::debug!(
                            ticker = %entry.ticker,
                            price = %result.price,
                            signal1 = result.signal1.is_active(),
                            signal2 = result.signal2.is_some(),
                            "신호 발견"
                        );
                        results.push(result);
                    }
                    reason => {
                        tracing::trace!(ticker = %entry.ticker, ?reason, "필터 제외");
                    }
                },
                Ok(None) => insufficient.push(entry.ticker.clone()),
                Err(e) => {
                    tracing::error!(ticker = %entry.ticker, error = %e, "신호 계산 실패");
                    errors.push(entry.ticker.clone());
                }
            }
        }

        // 안정 정렬: 같은 가격이면 처리 순서 유지
        results.sort_by(|a, b| b.price.cmp(&a.price));

        let summary = ScreenSummary {
            last_updated: Utc::now(),
            total_analyzed: krx_analyzed + us_analyzed,
            krx_analyzed,
            us_analyzed,
            krx_with_signals,
            us_with_signals,
            signal_breakdown: SignalBreakdown::from_results(&results),
            results,
            errors,
            insufficient,
            processing_time: started.elapsed(),
        };

        summary.log_summary();
        summary
    }
}
