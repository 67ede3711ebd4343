//! # Turtle Screener
//!
//! 터틀 트레이딩 돌파/이탈 신호 스크리너.
//!
//! - [`levels`] - 1일 지연 롤링 채널 레벨
//! - [`signal`] - 최신 일봉 기준 시그널 1(20/10일), 시그널 2(55/20일) 판정
//! - [`filter`] - 시장별 최소 가격/거래량 필터
//! - [`orchestrator`] - 수집 → 계산 → 필터 → 집계 파이프라인
//! - [`report`] - 결과 JSON 문서

pub mod error;
pub mod filter;
pub mod levels;
pub mod orchestrator;
pub mod report;
pub mod signal;
pub mod summary;

pub use error::SignalError;
pub use filter::{Eligibility, EligibilityFilter};
pub use levels::ChannelLevels;
pub use orchestrator::ScreeningOrchestrator;
pub use report::ScreenReport;
pub use signal::{ChannelSignal, EntrySignal, ExitSignal, Side, SignalCalculator, SignalResult};
pub use summary::{ScreenSummary, SignalBreakdown};
