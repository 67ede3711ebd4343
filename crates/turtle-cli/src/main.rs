//! 터틀 트레이딩 스크리너 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 스크리닝 (설정 파일의 유니버스 사용)
//! turtle --config config/screener.toml screen
//!
//! # 종목 목록 파일과 출력 경로 지정
//! turtle screen --krx-file data/krx.txt --us-file data/us.txt --output public/data/screener_results.json
//!
//! # 단일 종목 평가
//! turtle evaluate --ticker 005930
//! turtle evaluate --ticker AAPL --market US
//!
//! # 적용된 설정 확인
//! turtle config
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use turtle_cli::commands::evaluate::{run_evaluate, Evaluation};
use turtle_cli::commands::screen::{found_line, run_screen, ScreenArgs};
use turtle_cli::commands::show_config::render_config;
use turtle_core::{init_logging, LogConfig, Market, ScreenerConfig};

#[derive(Parser)]
#[command(name = "turtle")]
#[command(about = "Turtle Trading screener - KRX/US 채널 돌파 신호 스크리너", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 유니버스 스크리닝 후 결과 JSON 저장
    Screen {
        /// KRX 종목 목록 파일
        #[arg(long)]
        krx_file: Option<PathBuf>,

        /// US 종목 목록 파일
        #[arg(long)]
        us_file: Option<PathBuf>,

        /// 결과 JSON 경로
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 단일 종목 신호 평가
    Evaluate {
        /// 종목 코드/심볼 (예: 005930, AAPL)
        #[arg(short, long)]
        ticker: String,

        /// 시장 (KRX, US). 생략하면 티커에서 추론
        #[arg(short, long)]
        market: Option<Market>,
    },

    /// 적용된 설정을 TOML로 출력
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ScreenerConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(LogConfig::from_config(&config.logging))
        .map_err(|e| anyhow!("로깅 초기화 실패: {e}"))?;

    match cli.command {
        Commands::Screen {
            krx_file,
            us_file,
            output,
        } => {
            ScreenArgs {
                krx_file,
                us_file,
                output,
            }
            .apply(&mut config);

            tracing::info!("Turtle 스크리너 시작");
            let summary = run_screen(&config).await.inspect_err(|e| {
                tracing::error!(error = %e, "스크리닝 실패");
            })?;
            println!("{}", found_line(&summary));
        }

        Commands::Evaluate { ticker, market } => {
            match run_evaluate(&config, &ticker, market).await? {
                Evaluation::Insufficient { ticker } => {
                    println!("{ticker}: 신호 계산에 필요한 데이터가 부족합니다");
                }
                Evaluation::Evaluated {
                    result,
                    eligibility,
                } => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    println!("eligibility: {eligibility:?}");
                }
            }
        }

        Commands::Config => {
            print!("{}", render_config(&config)?);
        }
    }

    Ok(())
}
