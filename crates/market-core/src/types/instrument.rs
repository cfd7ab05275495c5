//! 종목 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 데이터 제공자가 인식하는 종목 식별자 (예: `RELIANCE.NS`).
///
/// 내부 구조를 해석하지 않는 불투명 식별자입니다. 정렬 순서는 문자열 순서를
/// 따르며, 데이터셋 정렬 키의 첫 번째 요소로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// 새 종목 식별자를 생성합니다. 앞뒤 공백은 제거됩니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.len() == symbol.len() {
            Self(symbol)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 거래소 접미사(`.NS`, `.BO` 등)를 제외한 티커.
    pub fn ticker(&self) -> &str {
        self.0.split_once('.').map(|(t, _)| t).unwrap_or(&self.0)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Instrument {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Instrument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_trims_whitespace() {
        assert_eq!(Instrument::new(" TCS.NS ").as_str(), "TCS.NS");
        assert_eq!(Instrument::from("INFY.NS").to_string(), "INFY.NS");
    }

    #[test]
    fn test_instrument_ticker() {
        assert_eq!(Instrument::new("HDFCBANK.NS").ticker(), "HDFCBANK");
        assert_eq!(Instrument::new("AAPL").ticker(), "AAPL");
    }

    #[test]
    fn test_instrument_ordering() {
        let mut list = vec![Instrument::new("TCS.NS"), Instrument::new("INFY.NS")];
        list.sort();
        assert_eq!(list[0].as_str(), "INFY.NS");
    }
}
