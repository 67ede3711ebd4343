//! 적용된 설정 출력.

use anyhow::{Context, Result};
use turtle_core::ScreenerConfig;

/// 설정을 TOML 문자열로 변환합니다.
pub fn render_config(config: &ScreenerConfig) -> Result<String> {
    toml::to_string_pretty(config).context("설정 직렬화 실패")
}
