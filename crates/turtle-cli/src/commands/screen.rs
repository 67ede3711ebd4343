//! 전체 스크리닝 실행 및 결과 저장.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use turtle_core::ScreenerConfig;
use turtle_data::{TickerUniverse, YahooChartProvider};
use turtle_screener::{ScreenReport, ScreenSummary, ScreeningOrchestrator};

/// `screen` 명령 인자. 지정하면 설정 파일 값보다 우선합니다.
#[derive(Debug, Clone, Default)]
pub struct ScreenArgs {
    pub krx_file: Option<PathBuf>,
    pub us_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl ScreenArgs {
    /// 인자를 설정에 덮어씁니다.
    pub fn apply(self, config: &mut ScreenerConfig) {
        if let Some(path) = self.krx_file {
            config.universe.krx_file = Some(path);
        }
        if let Some(path) = self.us_file {
            config.universe.us_file = Some(path);
        }
        if let Some(path) = self.output {
            config.output.path = path;
        }
    }
}

/// 스크리닝을 실행하고 결과 파일을 저장합니다.
pub async fn run_screen(config: &ScreenerConfig) -> Result<ScreenSummary> {
    let universe = TickerUniverse::load(
        config.universe.krx_file.as_deref(),
        config.universe.us_file.as_deref(),
    )
    .context("종목 유니버스 로드 실패")?;

    let provider =
        Arc::new(YahooChartProvider::new(&config.provider).context("HTTP 클라이언트 생성 실패")?);
    let orchestrator = ScreeningOrchestrator::from_config(provider, config);

    let summary = orchestrator.run(&universe).await;

    let report = ScreenReport::from_summary(&summary);
    save_report(&report, &config.output.path)?;
    tracing::info!(path = %config.output.path.display(), "결과 저장 완료");

    Ok(summary)
}

/// 결과 문서를 JSON 파일로 저장합니다. 상위 디렉토리가 없으면 생성합니다.
pub fn save_report(report: &ScreenReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("디렉토리 생성 실패: {}", parent.display()))?;
    }

    let json = report.to_json_pretty().context("결과 직렬화 실패")?;
    std::fs::write(path, json).with_context(|| format!("결과 저장 실패: {}", path.display()))?;
    Ok(())
}

/// 실행 결과 한 줄 요약.
pub fn found_line(summary: &ScreenSummary) -> String {
    format!(
        "Found {} stocks with signals (Signal1: {}, Signal2: {})",
        summary.total_signals_found(),
        summary.signal_breakdown.signal1_count,
        summary.signal_breakdown.signal2_count
    )
}
