//! Yahoo Finance 차트 API(v8) 기반 일봉 제공자.
//!
//! KRX 종목은 `.KS`/`.KQ` 접미사가 붙은 티커를 그대로 사용합니다.
//! 조정 종가가 있으면 시가/고가/저가/종가 모두에 조정 비율을 적용합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use turtle_core::{PriceBar, ProviderConfig};

use super::{DateRange, PriceHistoryProvider};
use crate::error::DataError;

/// Yahoo Finance 차트 API 응답 구조
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance 일봉 제공자.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// 설정으로 제공자를 생성합니다.
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, range: DateRange) -> String {
        let period1 = range
            .start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let period2 = range
            .end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url, ticker, period1, period2
        )
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        range: DateRange,
    ) -> Result<Vec<PriceBar>, DataError> {
        let url = self.chart_url(ticker, range);
        debug!(ticker, url = %url, "Yahoo 차트 요청");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(DataError::RateLimited(format!("{ticker}: HTTP 429")))
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(DataError::Http {
                    status: s.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        debug!(ticker, bytes = body.len(), "Yahoo 응답 수신");

        parse_chart(&body)
    }
}

/// 차트 응답 본문을 일봉 목록으로 변환합니다.
///
/// 필드가 하나라도 비어 있는 행은 버립니다. 같은 날짜가 여러 번 나오면
/// 마지막 행을 사용하며, 결과는 날짜 오름차순입니다.
fn parse_chart(body: &str) -> Result<Vec<PriceBar>, DataError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        return Err(DataError::Parse(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let gmtoffset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|ac| ac.into_iter().next())
        .and_then(|ac| ac.adjclose)
        .unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(o), Some(h), Some(l), Some(c), Some(v)) = (
            at(&opens, i),
            at(&highs, i),
            at(&lows, i),
            at(&closes, i),
            at(&volumes, i),
        ) else {
            continue;
        };

        let Some(date) = DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
        else {
            continue;
        };

        let factor = match at(&adj_closes, i) {
            Some(adj) if c != 0.0 => adj / c,
            _ => 1.0,
        };

        let (Some(open), Some(high), Some(low), Some(close)) = (
            to_price(o * factor),
            to_price(h * factor),
            to_price(l * factor),
            to_price(c * factor),
        ) else {
            continue;
        };

        by_date.insert(
            date,
            PriceBar::new(date, open, high, low, close, v.max(0.0) as u64),
        );
    }

    Ok(by_date.into_values().collect())
}

fn to_price(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "005930.KS", "gmtoffset": 32400 },
                "timestamp": [1704153600, 1704240000, 1704326400, 1704412800],
                "indicators": {
                    "quote": [{
                        "open":   [78200.0, 78500.0, null,    76700.0],
                        "high":   [79800.0, 78800.0, 77500.0, 77100.0],
                        "low":    [78200.0, 77000.0, 76200.0, 76200.0],
                        "close":  [79600.0, 77000.0, 76600.0, 76600.0],
                        "volume": [17142847, 21753644, 15324439, 11304316]
                    }],
                    "adjclose": [{ "adjclose": [79600.0, 77000.0, 76600.0, 76600.0] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_skips_null_rows() {
        let bars = parse_chart(SAMPLE).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, dec!(79600));
        assert_eq!(bars[0].volume, 17_142_847);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_chart_applies_adjustment_ratio() {
        let body = r#"{"chart":{"result":[{
            "meta": {"gmtoffset": 0},
            "timestamp": [1704153600],
            "indicators": {
                "quote": [{"open":[100.0],"high":[110.0],"low":[90.0],"close":[100.0],"volume":[1000]}],
                "adjclose": [{"adjclose":[50.0]}]
            }}],"error":null}}"#;

        let bars = parse_chart(body).unwrap();
        assert_eq!(bars[0].open, dec!(50));
        assert_eq!(bars[0].high, dec!(55));
        assert_eq!(bars[0].low, dec!(45));
        assert_eq!(bars[0].close, dec!(50));
    }

    #[test]
    fn test_parse_chart_not_found_is_empty() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_other_error_is_parse_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_chart_malformed_body() {
        assert!(matches!(parse_chart("<html>"), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_chart_url() {
        let provider = YahooChartProvider::new(&ProviderConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        })
        .unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert_eq!(
            provider.chart_url("AAPL", range),
            "http://localhost:8080/v8/finance/chart/AAPL?period1=1704067200&period2=1704239999&interval=1d&events=history"
        );
    }
}
