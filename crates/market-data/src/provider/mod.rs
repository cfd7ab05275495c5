//! 외부 데이터 제공자 추상화.
//!
//! 제공자는 종목 목록/기간/간격을 받아 OHLCV 레코드를 반환합니다. 일부 종목의
//! 실패는 `FetchReport::failures`에 담기고, 요청한 모든 종목이 실패한 경우에만
//! 에러가 됩니다.

pub mod yahoo;

pub use yahoo::YahooProvider;

use crate::error::{DataError, Result};
use async_trait::async_trait;
use market_core::{Dataset, Instrument, Timeframe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OHLCV 데이터 제공자.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 제공자에 요청을 보낼 수 있는지 확인합니다.
    async fn is_available(&self) -> bool;

    /// 종목별 OHLCV 데이터를 조회합니다.
    ///
    /// `period`는 제공자 기간 문자열(`5d`, `1y` 등), 간격은 `timeframe`으로 결정됩니다.
    async fn fetch(
        &self,
        symbols: &[Instrument],
        period: &str,
        timeframe: Timeframe,
    ) -> Result<FetchReport>;
}

/// 종목 단위 조회 실패.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub instrument: Instrument,
    pub reason: String,
}

impl SymbolFailure {
    pub fn new(instrument: Instrument, reason: impl Into<String>) -> Self {
        Self {
            instrument,
            reason: reason.into(),
        }
    }
}

/// 조회 결과. 성공한 종목의 레코드와 실패한 종목 목록을 함께 담습니다.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub dataset: Dataset,
    pub failures: Vec<SymbolFailure>,
}

impl FetchReport {
    /// 종목별 결과를 모아 조회 결과를 만듭니다.
    ///
    /// 요청한 종목이 하나 이상이고 모두 실패했다면 `TotalFetchFailure`를 반환합니다.
    pub fn collect(
        requested: usize,
        dataset: Dataset,
        failures: Vec<SymbolFailure>,
    ) -> Result<Self> {
        if requested > 0 && failures.len() >= requested {
            let reason = failures
                .iter()
                .take(3)
                .map(|f| format!("{}: {}", f.instrument, f.reason))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DataError::TotalFetchFailure { requested, reason });
        }
        Ok(Self { dataset, failures })
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 레코드를 하나 이상 반환한 종목.
    pub fn fetched_instruments(&self) -> BTreeSet<Instrument> {
        self.dataset.instruments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_total_failure() {
        let failures = vec![
            SymbolFailure::new("TCS.NS".into(), "timeout"),
            SymbolFailure::new("INFY.NS".into(), "no data"),
        ];
        let err = FetchReport::collect(2, Dataset::new(), failures).unwrap_err();
        assert!(matches!(err, DataError::TotalFetchFailure { requested: 2, .. }));
    }

    #[test]
    fn test_collect_partial_failure() {
        let failures = vec![SymbolFailure::new("TCS.NS".into(), "timeout")];
        let report = FetchReport::collect(2, Dataset::new(), failures).unwrap();
        assert!(report.is_partial());
    }

    #[test]
    fn test_collect_empty_request() {
        let report = FetchReport::collect(0, Dataset::new(), vec![]).unwrap();
        assert!(!report.is_partial());
        assert!(report.dataset.is_empty());
    }
}
