//! 스크리닝 결과 JSON 문서.
//!
//! 웹 대시보드가 읽는 `screener_results.json` 형식입니다. 현재가는 소수점 둘째 자리,
//! 평균 거래량은 정수(버림)로 출력합니다. 신호 가격과 채널 레벨은 반올림하지 않으며,
//! 비어 있는 신호/레벨은 `null`로 기록합니다.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use turtle_core::{DecimalExt, Market};

use crate::levels::LevelSnapshot;
use crate::signal::{ChannelSignal, EntrySignal, ExitSignal, Side, SignalResult};
use crate::summary::ScreenSummary;

/// 결과 문서 최상위.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub metadata: ReportMetadata,
    pub signal_breakdown: ReportBreakdown,
    pub filtered_stocks: Vec<ReportStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 UTC (`Z` 접미사)
    pub last_updated: String,
    pub total_analyzed: usize,
    pub total_signals_found: usize,
    pub krx_analyzed: usize,
    pub us_analyzed: usize,
    pub krx_with_signals: usize,
    pub us_with_signals: usize,
    pub processing_time_seconds: f64,
    pub errors_count: usize,
    pub errors: Vec<String>,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBreakdown {
    pub signal1_count: usize,
    pub signal2_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStock {
    pub ticker: String,
    pub name: String,
    pub market: Market,
    pub current_price: f64,
    pub volume_20_avg: Option<u64>,
    pub signals: ReportSignals,
    pub breakout_levels: ReportLevels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSignals {
    pub signal1: ReportChannel,
    pub signal2: ReportLongChannel,
}

/// 시그널 1: 진입/이탈 중 최대 하나만 값이 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportChannel {
    pub entry: Option<ReportEntry>,
    pub exit: Option<ReportExit>,
}

/// 시그널 2: 진입만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLongChannel {
    pub entry: Option<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    pub side: String,
    pub price: f64,
    pub breakout_level: f64,
    pub date: NaiveDate,
    pub exit_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExit {
    #[serde(rename = "type")]
    pub side: String,
    pub price: f64,
    pub breakdown_level: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLevels {
    pub high_20: Option<f64>,
    pub low_20: Option<f64>,
    pub high_55: Option<f64>,
    pub low_10: Option<f64>,
    pub low_20_exit: Option<f64>,
}

fn current_price(value: Decimal) -> f64 {
    value.round_half_up(2).to_f64_lossy()
}

fn level(value: Decimal) -> f64 {
    value.to_f64_lossy()
}

fn side(side: Side) -> String {
    match side {
        Side::Buy => "BUY".to_string(),
        Side::Sell => "SELL".to_string(),
    }
}

impl From<&EntrySignal> for ReportEntry {
    fn from(s: &EntrySignal) -> Self {
        Self {
            side: side(s.side),
            price: level(s.price),
            breakout_level: level(s.breakout_level),
            date: s.date,
            exit_level: level(s.exit_level),
        }
    }
}

impl From<&ExitSignal> for ReportExit {
    fn from(s: &ExitSignal) -> Self {
        Self {
            side: side(s.side),
            price: level(s.price),
            breakdown_level: level(s.breakdown_level),
            date: s.date,
        }
    }
}

impl From<&ChannelSignal> for ReportChannel {
    fn from(signal: &ChannelSignal) -> Self {
        Self {
            entry: signal.entry().map(ReportEntry::from),
            exit: signal.exit().map(ReportExit::from),
        }
    }
}

impl From<&LevelSnapshot> for ReportLevels {
    fn from(levels: &LevelSnapshot) -> Self {
        Self {
            high_20: levels.entry_high.map(level),
            low_20: levels.entry_low.map(level),
            high_55: levels.long_entry_high.map(level),
            low_10: levels.exit_low.map(level),
            low_20_exit: levels.long_exit_low.map(level),
        }
    }
}

impl From<&SignalResult> for ReportStock {
    fn from(result: &SignalResult) -> Self {
        Self {
            ticker: result.ticker.clone(),
            name: result.name.clone(),
            market: result.market,
            current_price: current_price(result.price),
            volume_20_avg: result.volume_avg.and_then(|v| v.trunc().to_u64()),
            signals: ReportSignals {
                signal1: ReportChannel::from(&result.signal1),
                signal2: ReportLongChannel {
                    entry: result.signal2.as_ref().map(ReportEntry::from),
                },
            },
            breakout_levels: ReportLevels::from(&result.levels),
        }
    }
}

impl ScreenReport {
    /// 요약에서 결과 문서를 생성합니다.
    pub fn from_summary(summary: &ScreenSummary) -> Self {
        Self {
            metadata: ReportMetadata {
                last_updated: format_timestamp(summary.last_updated),
                total_analyzed: summary.total_analyzed,
                total_signals_found: summary.total_signals_found(),
                krx_analyzed: summary.krx_analyzed,
                us_analyzed: summary.us_analyzed,
                krx_with_signals: summary.krx_with_signals,
                us_with_signals: summary.us_with_signals,
                processing_time_seconds: (summary.processing_time.as_secs_f64() * 100.0).round()
                    / 100.0,
                errors_count: summary.errors.len(),
                errors: summary.errors.clone(),
                success_rate: summary.success_rate(),
            },
            signal_breakdown: ReportBreakdown {
                signal1_count: summary.signal_breakdown.signal1_count,
                signal2_count: summary.signal_breakdown.signal2_count,
            },
            filtered_stocks: summary.results.iter().map(ReportStock::from).collect(),
        }
    }

    /// 들여쓰기된 JSON 문자열.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
