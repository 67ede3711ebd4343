//! 스크리닝 대상 종목 유니버스.
//!
//! 텍스트 파일에서 시장별 종목 목록을 읽습니다. 한 줄에 한 종목,
//! `ticker[,name]` 형식이며 빈 줄과 `#` 주석은 무시합니다.
//!
//! ```text
//! ticker,name
//! 005930,삼성전자
//! 035720.KQ,카카오
//! BRK.B,Berkshire Hathaway
//! ```

use std::collections::HashSet;
use std::path::Path;

use turtle_core::{Market, KOSDAQ_SUFFIX, KOSPI_SUFFIX};

use crate::error::DataError;

/// 유니버스의 한 종목.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseEntry {
    /// Yahoo 형식 티커 (예: "005930.KS", "BRK-B")
    pub ticker: String,
    /// 표시 이름. 주어지지 않으면 티커와 같습니다.
    pub name: String,
    pub market: Market,
}

impl UniverseEntry {
    /// 시장 규칙에 따라 티커를 정규화하여 생성합니다.
    pub fn new(raw_ticker: &str, name: Option<&str>, market: Market) -> Self {
        let ticker = normalize_ticker(raw_ticker, market);
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| ticker.clone());

        Self {
            ticker,
            name,
            market,
        }
    }
}

/// 시장별 종목 목록. KRX가 먼저 처리됩니다.
#[derive(Debug, Clone, Default)]
pub struct TickerUniverse {
    krx: Vec<UniverseEntry>,
    us: Vec<UniverseEntry>,
}

impl TickerUniverse {
    /// 두 목록으로 유니버스를 만듭니다.
    ///
    /// 티커별로 첫 등장만 남깁니다. KRX 목록이 먼저이므로 두 시장에 모두 있는
    /// 티커는 KRX 항목으로 남습니다.
    pub fn new(krx: Vec<UniverseEntry>, us: Vec<UniverseEntry>) -> Self {
        let mut seen = HashSet::with_capacity(krx.len() + us.len());
        Self {
            krx: dedupe(krx, Market::Krx, &mut seen),
            us: dedupe(us, Market::Us, &mut seen),
        }
    }

    /// 티커 목록만으로 유니버스를 만듭니다.
    pub fn from_tickers<K, U>(krx: K, us: U) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        Self::new(
            krx.into_iter()
                .map(|t| UniverseEntry::new(t.as_ref(), None, Market::Krx))
                .collect(),
            us.into_iter()
                .map(|t| UniverseEntry::new(t.as_ref(), None, Market::Us))
                .collect(),
        )
    }

    /// 시장별 파일에서 유니버스를 로드합니다. 경로가 없으면 해당 시장은 비어 있습니다.
    pub fn load(krx_file: Option<&Path>, us_file: Option<&Path>) -> Result<Self, DataError> {
        let krx = match krx_file {
            Some(path) => read_entries(path, Market::Krx)?,
            None => Vec::new(),
        };
        let us = match us_file {
            Some(path) => read_entries(path, Market::Us)?,
            None => Vec::new(),
        };

        let universe = Self::new(krx, us);
        tracing::info!(
            krx = universe.krx.len(),
            us = universe.us.len(),
            "종목 유니버스 로드 완료"
        );
        Ok(universe)
    }

    pub fn krx(&self) -> &[UniverseEntry] {
        &self.krx
    }

    pub fn us(&self) -> &[UniverseEntry] {
        &self.us
    }

    /// KRX, US 순서로 모든 종목을 순회합니다.
    pub fn entries(&self) -> impl Iterator<Item = &UniverseEntry> {
        self.krx.iter().chain(self.us.iter())
    }

    pub fn len(&self) -> usize {
        self.krx.len() + self.us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.krx.is_empty() && self.us.is_empty()
    }
}

/// 목록 텍스트를 파싱합니다.
pub fn parse_entries(content: &str, market: Market) -> Vec<UniverseEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (ticker, name) = match line.split_once(',') {
                Some((t, n)) => (t.trim(), Some(n)),
                None => (line, None),
            };
            if ticker.is_empty() || ticker.eq_ignore_ascii_case("ticker") {
                return None;
            }
            Some(UniverseEntry::new(ticker, name, market))
        })
        .collect()
}

fn read_entries(path: &Path, market: Market) -> Result<Vec<UniverseEntry>, DataError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DataError::Universe(format!("{}: {}", path.display(), e)))?;
    Ok(parse_entries(&content, market))
}

/// 시장 규칙에 따라 티커를 Yahoo 형식으로 정규화합니다.
///
/// - KRX: 6자리 숫자 코드에는 `.KS`를 붙이고, `.KS`/`.KQ`가 있으면 그대로 둡니다.
/// - US: `.`을 `-`로 바꾸고 대문자로 변환합니다 (BRK.B → BRK-B).
pub fn normalize_ticker(raw: &str, market: Market) -> String {
    let raw = raw.trim();
    match market {
        Market::Krx => {
            let upper = raw.to_ascii_uppercase();
            if upper.ends_with(KOSPI_SUFFIX) || upper.ends_with(KOSDAQ_SUFFIX) {
                upper
            } else if upper.len() == 6 && upper.chars().all(|c| c.is_ascii_digit()) {
                format!("{upper}{KOSPI_SUFFIX}")
            } else {
                upper
            }
        }
        Market::Us => raw.replace('.', "-").to_ascii_uppercase(),
    }
}

fn dedupe(
    entries: Vec<UniverseEntry>,
    market: Market,
    seen: &mut HashSet<String>,
) -> Vec<UniverseEntry> {
    let before = entries.len();
    let unique: Vec<_> = entries
        .into_iter()
        .filter(|e| seen.insert(e.ticker.clone()))
        .collect();

    let dropped = before - unique.len();
    if dropped > 0 {
        tracing::info!(market = %market, dropped, "중복 종목 제거");
    }
    unique
}
