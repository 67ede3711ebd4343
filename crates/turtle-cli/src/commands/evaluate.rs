//! 단일 종목 신호 평가.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use turtle_core::{Market, ScreenerConfig};
use turtle_data::universe::normalize_ticker;
use turtle_data::{BatchFetcher, YahooChartProvider};
use turtle_screener::{Eligibility, EligibilityFilter, SignalCalculator, SignalResult};

/// 평가 결과.
#[derive(Debug)]
pub enum Evaluation {
    /// 데이터 부족
    Insufficient { ticker: String },
    Evaluated {
        result: Box<SignalResult>,
        eligibility: Eligibility,
    },
}

/// 시장이 주어지지 않으면 티커에서 추론합니다. 6자리 숫자 코드는 KRX로 봅니다.
pub fn resolve_ticker(raw: &str, market: Option<Market>) -> (String, Market) {
    let market = market.unwrap_or_else(|| {
        let raw = raw.trim();
        if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
            Market::Krx
        } else {
            Market::from_ticker(&raw.to_ascii_uppercase())
        }
    });
    (normalize_ticker(raw, market), market)
}

/// 한 종목을 수집하여 평가합니다.
pub async fn run_evaluate(
    config: &ScreenerConfig,
    raw_ticker: &str,
    market: Option<Market>,
) -> Result<Evaluation> {
    let (ticker, market) = resolve_ticker(raw_ticker, market);

    let provider =
        Arc::new(YahooChartProvider::new(&config.provider).context("HTTP 클라이언트 생성 실패")?);
    let fetcher = BatchFetcher::new(provider, &config.fetch);

    let Some(series) = fetcher
        .fetch_one(&ticker, Utc::now().date_naive())
        .await
        .with_context(|| format!("{ticker} 시세 조회 실패"))?
    else {
        return Ok(Evaluation::Insufficient { ticker });
    };

    let calculator = SignalCalculator::new(config.strategy.clone());
    let Some(result) = calculator.evaluate(&ticker, &ticker, market, &series)? else {
        return Ok(Evaluation::Insufficient { ticker });
    };

    let eligibility = EligibilityFilter::new(config.filters.clone()).check(&result);
    Ok(Evaluation::Evaluated {
        result: Box::new(result),
        eligibility,
    })
}
