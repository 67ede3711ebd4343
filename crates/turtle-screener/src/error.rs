//! 신호 계산 오류.

use thiserror::Error;

/// 종목 단위 신호 계산 오류. 오케스트레이터는 이를 해당 종목의 오류로 기록하고 계속 진행합니다.
#[derive(Debug, Error)]
pub enum SignalError {
    /// 산술 오버플로 등 계산 실패
    #[error("계산 오류 ({ticker}): {reason}")]
    Calculation { ticker: String, reason: String },
}

impl SignalError {
    pub fn calculation(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Calculation {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}
