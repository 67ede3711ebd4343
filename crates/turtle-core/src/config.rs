//! 설정 관리.
//!
//! 스크리너 실행에 필요한 모든 파라미터(배치 크기, 재시도 횟수, 조회 기간,
//! 채널 기간, 시장별 필터 기준)를 하나의 값 객체로 정의합니다.
//! 전역 상태 없이 생성 시점에 오케스트레이터로 전달됩니다.
//!
//! 로드 우선순위: 기본값 → TOML 파일 → 환경 변수(`TURTLE__SECTION__KEY`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::Market;

/// 스크리너 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// 시세 수집 설정
    pub fetch: FetchConfig,
    /// 시세 제공자(Yahoo Finance) 설정
    pub provider: ProviderConfig,
    /// 터틀 트레이딩 채널 기간
    pub strategy: StrategyConfig,
    /// 시장별 가격/유동성 필터
    pub filters: FilterConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 종목 유니버스 파일
    pub universe: UniverseConfig,
    /// 결과 저장 설정
    pub output: OutputConfig,
}

/// 시세 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// 배치당 종목 수
    pub batch_size: usize,
    /// 종목당 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 재시도 간 대기 (밀리초)
    pub retry_delay_ms: u64,
    /// 재시도 대기를 시도 횟수에 비례해 늘릴지 여부
    pub linear_backoff: bool,
    /// 배치 간 대기 (밀리초)
    pub batch_delay_ms: u64,
    /// 조회 기간 (달력 기준 일수)
    pub lookback_days: u32,
    /// 신호 계산에 필요한 최소 일봉 수
    pub min_bars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 3,
            retry_delay_ms: 1000,
            linear_backoff: false,
            batch_delay_ms: 1000,
            lookback_days: 200,
            min_bars: 60,
        }
    }
}

impl FetchConfig {
    /// 재시도 간 대기를 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// 배치 간 대기를 Duration으로 반환
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// 시세 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Yahoo Finance 차트 API 기본 URL
    pub base_url: String,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 터틀 트레이딩 채널 기간.
///
/// - 시그널 1: `entry_period`일 돌파 진입, `exit_period`일 이탈 청산
/// - 시그널 2: `long_entry_period`일 돌파 진입, `long_exit_period`일 청산 기준
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// 시그널 1 진입 채널 (기본: 20)
    pub entry_period: usize,
    /// 시그널 1 청산 기준 (기본: 10)
    pub exit_period: usize,
    /// 시그널 2 진입 채널 (기본: 55, 11주)
    pub long_entry_period: usize,
    /// 시그널 2 청산 기준 (기본: 20, 4주)
    pub long_exit_period: usize,
    /// 평균 거래량 기간 (기본: 20)
    pub volume_avg_period: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            entry_period: 20,
            exit_period: 10,
            long_entry_period: 55,
            long_exit_period: 20,
            volume_avg_period: 20,
        }
    }
}

impl StrategyConfig {
    /// 가장 긴 채널 기간.
    pub fn longest_window(&self) -> usize {
        [
            self.entry_period,
            self.exit_period,
            self.long_entry_period,
            self.long_exit_period,
            self.volume_avg_period,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }

    /// 신호 계산에 필요한 최소 일봉 수 (가장 긴 채널 + 1일 지연).
    pub fn min_required_bars(&self) -> usize {
        self.longest_window() + 1
    }
}

/// 시장별 최소 가격/유동성 기준.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketThreshold {
    /// 최소 종가 (현지 통화)
    #[serde(with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
    /// 최소 20일 평균 거래량 (주)
    pub min_avg_volume: u64,
}

/// 시장별 필터 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// KRX 기준 (기본: 5,000원 / 10만주)
    pub krx: MarketThreshold,
    /// US 기준 (기본: $5 / 20만주)
    pub us: MarketThreshold,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            krx: MarketThreshold {
                min_price: dec!(5000),
                min_avg_volume: 100_000,
            },
            us: MarketThreshold {
                min_price: dec!(5.0),
                min_avg_volume: 200_000,
            },
        }
    }
}

impl FilterConfig {
    /// 시장에 해당하는 기준을 반환합니다.
    pub fn threshold(&self, market: Market) -> &MarketThreshold {
        match market {
            Market::Krx => &self.krx,
            Market::Us => &self.us,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// 종목 유니버스 파일 경로.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// KRX 종목 목록 파일
    pub krx_file: Option<PathBuf>,
    /// US 종목 목록 파일
    pub us_file: Option<PathBuf>,
}

/// 결과 저장 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 결과 JSON 경로
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("public/data/screener_results.json"),
        }
    }
}

impl ScreenerConfig {
    /// 기본값, 선택적 TOML 파일, 환경 변수 순으로 설정을 로드합니다.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("TURTLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// TOML 문자열에서 설정을 로드합니다. 누락된 항목은 기본값을 사용합니다.
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 설정 값의 정합성을 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fetch.batch_size == 0 {
            return Err(CoreError::Config("fetch.batch_size는 1 이상이어야 합니다".into()));
        }
        if self.fetch.max_attempts == 0 {
            return Err(CoreError::Config(
                "fetch.max_attempts는 1 이상이어야 합니다".into(),
            ));
        }
        if self.fetch.lookback_days == 0 {
            return Err(CoreError::Config(
                "fetch.lookback_days는 1 이상이어야 합니다".into(),
            ));
        }

        let s = &self.strategy;
        if [
            s.entry_period,
            s.exit_period,
            s.long_entry_period,
            s.long_exit_period,
            s.volume_avg_period,
        ]
        .contains(&0)
        {
            return Err(CoreError::Config("채널 기간은 모두 1 이상이어야 합니다".into()));
        }

        if self.fetch.min_bars < s.min_required_bars() {
            return Err(CoreError::Config(format!(
                "fetch.min_bars({})는 최소 {} 이상이어야 합니다",
                self.fetch.min_bars,
                s.min_required_bars()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScreenerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.batch_size, 50);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.lookback_days, 200);
        assert_eq!(config.strategy.min_required_bars(), 56);
    }

    #[test]
    fn test_default_thresholds() {
        let filters = FilterConfig::default();
        assert_eq!(filters.threshold(Market::Krx).min_price, dec!(5000));
        assert_eq!(filters.threshold(Market::Krx).min_avg_volume, 100_000);
        assert_eq!(filters.threshold(Market::Us).min_price, dec!(5));
        assert_eq!(filters.threshold(Market::Us).min_avg_volume, 200_000);
    }

    #[test]
    fn test_from_toml_overrides_partially() {
        let config = ScreenerConfig::from_toml_str(
            r#"
            [fetch]
            batch_size = 10
            batch_delay_ms = 0

            [filters.us]
            min_price = 10.5
            min_avg_volume = 500000
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.batch_size, 10);
        assert_eq!(config.fetch.batch_delay_ms, 0);
        // 지정하지 않은 값은 기본값 유지
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.filters.us.min_price, dec!(10.5));
        assert_eq!(config.filters.us.min_avg_volume, 500_000);
        assert_eq!(config.filters.krx.min_price, dec!(5000));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = ScreenerConfig::default();
        config.fetch.batch_size = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_min_bars_below_longest_window() {
        let mut config = ScreenerConfig::default();
        config.fetch.min_bars = 55;
        assert!(config.validate().is_err());

        config.fetch.min_bars = 56;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_renders_as_toml() {
        let config = ScreenerConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        assert!(rendered.contains("batch_size = 50"));
        assert!(rendered.contains("min_price = 5000.0"));
    }
}
