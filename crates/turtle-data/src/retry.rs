//! 재시도 정책.

use std::time::Duration;

use turtle_core::FetchConfig;

/// 재시도 간 대기 증가 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// 매번 같은 시간 대기
    Fixed,
    /// 시도 횟수에 비례해 대기 (delay × attempt)
    Linear,
}

/// 종목 단위 재시도 정책.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 기본 대기 시간
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff,
        }
    }

    /// 수집 설정에서 정책을 생성합니다.
    pub fn from_config(config: &FetchConfig) -> Self {
        let backoff = if config.linear_backoff {
            Backoff::Linear
        } else {
            Backoff::Fixed
        };
        Self::new(config.max_attempts, config.retry_delay(), backoff)
    }

    /// `attempt`번째 시도가 실패한 뒤 다음 시도 전까지 대기할 시간.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Linear => self.delay.saturating_mul(attempt.max(1)),
        }
    }

    /// `attempt`번 실패한 뒤 한 번 더 시도할 수 있는지 확인.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
