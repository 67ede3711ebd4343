//! 데이터 모듈 오류 타입.

use thiserror::Error;
use turtle_core::CoreError;

/// 시세 수집 및 유니버스 로드 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 네트워크/연결 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 제공자가 반환한 HTTP 오류
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 시계열 불변식 위반
    #[error(transparent)]
    InvalidSeries(#[from] CoreError),

    /// 배치 응답에 요청한 종목이 없음
    #[error("No response for ticker: {0}")]
    MissingResponse(String),

    /// 유니버스 파일 입출력 오류
    #[error("Universe error: {0}")]
    Universe(String),
}

impl DataError {
    /// 재시도 가능한 일시적 오류인지 확인.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Network(_) | DataError::Timeout(_) | DataError::RateLimited(_) => true,
            DataError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            DataError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            DataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}
