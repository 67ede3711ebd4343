//! 스크리너 CLI 명령 구현.
//!
//! - `screen` - 전체 유니버스 스크리닝 후 결과 JSON 저장
//! - `evaluate` - 단일 종목 신호 평가
//! - `config` - 적용된 설정 출력

pub mod commands;
