//! 스크리닝 실행 요약.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::signal::SignalResult;

/// 신호 종류별 통과 종목 수. 한 종목이 두 신호 모두에 집계될 수 있습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalBreakdown {
    /// 시그널 1 진입 또는 이탈
    pub signal1_count: usize,
    /// 시그널 2 진입
    pub signal2_count: usize,
}

impl SignalBreakdown {
    pub fn from_results(results: &[SignalResult]) -> Self {
        Self {
            signal1_count: results.iter().filter(|r| r.signal1.is_active()).count(),
            signal2_count: results.iter().filter(|r| r.signal2.is_some()).count(),
        }
    }
}

/// 한 번의 스크리닝 결과.
#[derive(Debug, Clone)]
pub struct ScreenSummary {
    pub last_updated: DateTime<Utc>,
    /// 유니버스 전체 종목 수 (KRX + US)
    pub total_analyzed: usize,
    pub krx_analyzed: usize,
    pub us_analyzed: usize,
    pub krx_with_signals: usize,
    pub us_with_signals: usize,
    /// 필터 통과 종목 (종가 내림차순)
    pub results: Vec<SignalResult>,
    /// 수집 또는 계산에 실패한 종목
    pub errors: Vec<String>,
    /// 데이터 부족으로 제외된 종목 (오류 아님)
    pub insufficient: Vec<String>,
    pub processing_time: Duration,
    pub signal_breakdown: SignalBreakdown,
}

impl ScreenSummary {
    /// 빈 유니버스에 대한 요약.
    pub fn empty(last_updated: DateTime<Utc>) -> Self {
        Self {
            last_updated,
            total_analyzed: 0,
            krx_analyzed: 0,
            us_analyzed: 0,
            krx_with_signals: 0,
            us_with_signals: 0,
            results: Vec::new(),
            errors: Vec::new(),
            insufficient: Vec::new(),
            processing_time: Duration::ZERO,
            signal_breakdown: SignalBreakdown::default(),
        }
    }

    /// 필터 통과 종목 수.
    pub fn total_signals_found(&self) -> usize {
        self.results.len()
    }

    /// 오류 없이 처리된 비율 (%), 소수점 첫째 자리 반올림. 분석 종목이 없으면 0.
    pub fn success_rate(&self) -> f64 {
        if self.total_analyzed == 0 {
            return 0.0;
        }
        let ok = self.total_analyzed.saturating_sub(self.errors.len());
        let rate = ok as f64 * 100.0 / self.total_analyzed as f64;
        (rate * 10.0).round() / 10.0
    }

    /// 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total_analyzed,
            krx = self.krx_analyzed,
            us = self.us_analyzed,
            found = self.total_signals_found(),
            krx_with_signals = self.krx_with_signals,
            us_with_signals = self.us_with_signals,
            errors = self.errors.len(),
            insufficient = self.insufficient.len(),
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.processing_time.as_secs_f64()),
            "스크리닝 완료"
        );
        tracing::info!(
            signal1 = self.signal_breakdown.signal1_count,
            signal2 = self.signal_breakdown.signal2_count,
            "신호 분포"
        );
    }
}
