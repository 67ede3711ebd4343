//! 시장 구분.
//!
//! 스크리너는 두 개의 시장만 다룹니다:
//! - `Krx` - 한국거래소 (코스피 `.KS`, 코스닥 `.KQ`)
//! - `Us` - 미국 시장 (S&P 500, NASDAQ)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 코스피 종목의 Yahoo Finance 접미사.
pub const KOSPI_SUFFIX: &str = ".KS";
/// 코스닥 종목의 Yahoo Finance 접미사.
pub const KOSDAQ_SUFFIX: &str = ".KQ";

/// 스크리닝 대상 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// 한국거래소 (KOSPI + KOSDAQ)
    #[serde(rename = "KRX")]
    Krx,
    /// 미국 시장
    #[serde(rename = "US")]
    Us,
}

impl Market {
    /// 티커 접미사로 시장을 판별합니다.
    ///
    /// `.KS` 또는 `.KQ`로 끝나면 KRX, 그 외는 모두 US입니다.
    pub fn from_ticker(ticker: &str) -> Self {
        if ticker.ends_with(KOSPI_SUFFIX) || ticker.ends_with(KOSDAQ_SUFFIX) {
            Market::Krx
        } else {
            Market::Us
        }
    }

    /// 출력용 시장 태그.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Krx => "KRX",
            Market::Us => "US",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KRX" | "KR" | "KOREA" | "KOSPI" | "KOSDAQ" => Ok(Market::Krx),
            "US" | "USA" | "NYSE" | "NASDAQ" => Ok(Market::Us),
            _ => Err(format!("Unknown market: {}. Supported: KRX, US", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_from_ticker() {
        assert_eq!(Market::from_ticker("005930.KS"), Market::Krx);
        assert_eq!(Market::from_ticker("035720.KQ"), Market::Krx);
        assert_eq!(Market::from_ticker("AAPL"), Market::Us);
        assert_eq!(Market::from_ticker("BRK-B"), Market::Us);
    }

    #[test]
    fn test_market_parsing() {
        assert_eq!("krx".parse::<Market>().unwrap(), Market::Krx);
        assert_eq!("KOSDAQ".parse::<Market>().unwrap(), Market::Krx);
        assert_eq!("nasdaq".parse::<Market>().unwrap(), Market::Us);
        assert!("tse".parse::<Market>().is_err());
    }

    #[test]
    fn test_market_serde_tag() {
        assert_eq!(serde_json::to_string(&Market::Krx).unwrap(), "\"KRX\"");
        assert_eq!(serde_json::to_string(&Market::Us).unwrap(), "\"US\"");
    }
}
