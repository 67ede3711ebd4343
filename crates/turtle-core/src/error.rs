//! 스크리너 핵심 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 가격 시계열 불변식 위반 (날짜 중복, 역순 등)
    #[error("잘못된 시계열 ({ticker}): {reason}")]
    InvalidSeries { ticker: String, reason: String },
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 시계열 불변식 위반 에러를 생성합니다.
    pub fn invalid_series(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidSeries {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
