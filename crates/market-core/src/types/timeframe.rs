//! 갱신 대상 타임프레임 정의.
//!
//! 이 모듈은 데이터 세분도와 갱신 주기를 나타내는 타임프레임 타입과
//! 타임프레임별 데이터셋 병합 방식을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 갱신 타임프레임.
///
/// 설정 파일과 저장소 파일명에서는 `15m`, `1h`, `1d`, `1wk` 문자열을 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 15분봉 (빠른 장중 갱신)
    #[serde(rename = "15m")]
    M15,
    /// 1시간봉 (느린 장중 갱신)
    #[serde(rename = "1h")]
    H1,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
    /// 주봉
    #[serde(rename = "1wk")]
    W1,
}

impl Timeframe {
    /// 모든 타임프레임 (짧은 주기 → 긴 주기 순).
    pub const ALL: [Timeframe; 4] = [Timeframe::M15, Timeframe::H1, Timeframe::D1, Timeframe::W1];

    /// 이 타임프레임의 명목 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M15 => Duration::from_secs(15 * 60),
            Timeframe::H1 => Duration::from_secs(60 * 60),
            Timeframe::D1 => Duration::from_secs(24 * 60 * 60),
            Timeframe::W1 => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// 이 타임프레임의 분 단위 값을 반환합니다.
    pub fn as_minutes(&self) -> u64 {
        self.duration().as_secs() / 60
    }

    /// 데이터 제공자 간격 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1wk",
        }
    }

    /// 간격 문자열에서 파싱합니다.
    pub fn from_interval(s: &str) -> Option<Self> {
        match s {
            "15m" => Some(Timeframe::M15),
            "1h" | "60m" => Some(Timeframe::H1),
            "1d" => Some(Timeframe::D1),
            "1wk" | "1w" => Some(Timeframe::W1),
            _ => None,
        }
    }

    /// 분봉/시간봉인지 확인합니다.
    pub fn is_intraday(&self) -> bool {
        matches!(self, Timeframe::M15 | Timeframe::H1)
    }

    /// 타임프레임의 기본 병합 방식.
    ///
    /// 주봉은 재집계된 봉이 누적되지 않도록 전체 교체합니다.
    pub fn default_merge_mode(&self) -> MergeMode {
        match self {
            Timeframe::W1 => MergeMode::FullReplace,
            _ => MergeMode::AppendDedup,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_interval(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

/// 데이터셋 병합 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// 기존 데이터에 추가 후 (종목, 시각) 기준 중복 제거
    AppendDedup,
    /// 기존 데이터를 버리고 새 데이터로 전체 교체
    FullReplace,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::AppendDedup => write!(f, "append_dedup"),
            MergeMode::FullReplace => write!(f, "full_replace"),
        }
    }
}
