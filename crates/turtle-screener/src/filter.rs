//! 시장별 최소 가격/유동성 필터.
//!
//! | 시장 | 최소 종가 | 최소 20일 평균 거래량 |
//! |------|-----------|------------------------|
//! | KRX  | 5,000원   | 100,000주              |
//! | US   | $5        | 200,000주              |
//!
//! 기준값과 같으면 통과합니다. 신호가 하나도 없는 종목은 제외합니다.

use rust_decimal::Decimal;
use turtle_core::{FilterConfig, MarketThreshold};

use crate::signal::SignalResult;

/// 필터 판정 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// 통과
    Accepted,
    /// 종가가 최소 가격 미만
    PriceTooLow,
    /// 평균 거래량이 최소 기준 미만 (또는 계산 불가)
    VolumeTooLow,
    /// 활성 신호 없음
    NoSignal,
}

impl Eligibility {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Eligibility::Accepted)
    }
}

/// 적격성 필터.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    config: FilterConfig,
}

impl EligibilityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// 시장 기준.
    pub fn threshold(&self, result: &SignalResult) -> &MarketThreshold {
        self.config.threshold(result.market)
    }

    /// 결과가 필터를 통과하는지 확인.
    pub fn accepts(&self, result: &SignalResult) -> bool {
        self.check(result).is_accepted()
    }

    /// 첫 번째 탈락 사유를 반환합니다.
    pub fn check(&self, result: &SignalResult) -> Eligibility {
        let threshold = self.threshold(result);

        if result.price < threshold.min_price {
            return Eligibility::PriceTooLow;
        }

        let min_volume = Decimal::from(threshold.min_avg_volume);
        match result.volume_avg {
            Some(avg) if avg >= min_volume => {}
            _ => return Eligibility::VolumeTooLow,
        }

        if !result.has_signal() {
            return Eligibility::NoSignal;
        }

        Eligibility::Accepted
    }
}
