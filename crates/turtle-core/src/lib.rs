//! # Turtle Core
//!
//! 터틀 트레이딩 스크리너의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 스크리너 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 구분 (KRX / US)
//! - 일봉(OHLCV) 및 가격 시계열
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use self::error::*;
pub use self::logging::*;
pub use self::types::*;
