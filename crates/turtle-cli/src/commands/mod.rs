//! CLI 명령어 구현 모듈.

pub mod evaluate;
pub mod screen;
pub mod show_config;
