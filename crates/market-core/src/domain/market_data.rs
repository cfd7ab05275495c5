//! OHLCV 레코드와 데이터셋.
//!
//! - `DataRecord`: 한 종목의 한 시점 OHLCV 값
//! - `Dataset`: 한 타임프레임의 레코드 모음
//! - `DatasetSummary`: 데이터셋 요약 통계

use crate::types::Instrument;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeBounds;

/// OHLCV 레코드.
///
/// 한 데이터셋 안에서 `(instrument, timestamp)` 쌍은 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    pub instrument: Instrument,
    /// 봉 시작 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl DataRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instrument: Instrument,
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            instrument,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 병합/정렬 키.
    pub fn key(&self) -> (&Instrument, DateTime<Utc>) {
        (&self.instrument, self.timestamp)
    }
}

/// 한 타임프레임의 OHLCV 데이터셋.
///
/// 병합을 거친 데이터셋은 `(instrument, timestamp)` 순으로 정렬되어 있고
/// 중복 키가 없습니다. 제공자 응답처럼 정렬되지 않은 레코드도 담을 수 있으며,
/// `normalize`로 정렬/중복 제거 상태로 만듭니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<DataRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 목록으로 데이터셋을 생성합니다 (정렬하지 않음).
    pub fn from_records(records: Vec<DataRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DataRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DataRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: DataRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    /// 정렬하고 중복 키를 제거합니다. 같은 키는 나중에 들어온 레코드가 남습니다.
    pub fn normalize(self) -> Self {
        let mut by_key: BTreeMap<(Instrument, DateTime<Utc>), DataRecord> = BTreeMap::new();
        for record in self.records {
            by_key.insert((record.instrument.clone(), record.timestamp), record);
        }
        Self {
            records: by_key.into_values().collect(),
        }
    }

    /// `(instrument, timestamp)` 순으로 엄격하게 정렬되어 있는지 확인합니다.
    ///
    /// 엄격한 정렬은 중복 키가 없음을 함께 의미합니다.
    pub fn is_normalized(&self) -> bool {
        self.records.windows(2).all(|w| w[0].key() < w[1].key())
    }

    /// 데이터셋에 포함된 종목 집합.
    pub fn instruments(&self) -> BTreeSet<Instrument> {
        self.records.iter().map(|r| r.instrument.clone()).collect()
    }

    /// 가장 최근 레코드 시각. `instrument`가 주어지면 해당 종목으로 한정합니다.
    pub fn latest_timestamp(&self, instrument: Option<&Instrument>) -> Option<DateTime<Utc>> {
        self.records
            .iter()
            .filter(|r| instrument.map_or(true, |i| &r.instrument == i))
            .map(|r| r.timestamp)
            .max()
    }

    /// 종목과 시각 범위로 레코드를 걸러낸 새 데이터셋을 만듭니다.
    ///
    /// `instruments`가 `None`이거나 비어 있으면 모든 종목을 포함합니다.
    pub fn filter<R>(&self, instruments: Option<&[Instrument]>, range: R) -> Dataset
    where
        R: RangeBounds<DateTime<Utc>>,
    {
        let wanted: Option<BTreeSet<&Instrument>> = instruments
            .filter(|list| !list.is_empty())
            .map(|list| list.iter().collect());

        self.records
            .iter()
            .filter(|r| wanted.as_ref().map_or(true, |set| set.contains(&r.instrument)))
            .filter(|r| range.contains(&r.timestamp))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            records: self.records.len(),
            instruments: self.instruments().len(),
            first: self.records.iter().map(|r| r.timestamp).min(),
            last: self.latest_timestamp(None),
        }
    }
}

impl FromIterator<DataRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = DataRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = DataRecord;
    type IntoIter = std::vec::IntoIter<DataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// 데이터셋 요약.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// 레코드 수
    pub records: usize,
    /// 고유 종목 수
    pub instruments: usize,
    /// 가장 오래된 레코드 시각
    pub first: Option<DateTime<Utc>>,
    /// 가장 최근 레코드 시각
    pub last: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn record(symbol: &str, hour: u32, close: Decimal) -> DataRecord {
        DataRecord::new(
            Instrument::new(symbol),
            Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap(),
            dec!(100),
            dec!(110),
            dec!(90),
            close,
            dec!(1000),
        )
    }

    #[test]
    fn test_normalize_sorts_and_keeps_last() {
        let ds = Dataset::from_records(vec![
            record("TCS.NS", 5, dec!(101)),
            record("INFY.NS", 4, dec!(102)),
            record("TCS.NS", 4, dec!(103)),
            record("TCS.NS", 5, dec!(104)),
        ])
        .normalize();

        assert_eq!(ds.len(), 3);
        assert!(ds.is_normalized());
        assert_eq!(ds.records()[0].instrument.as_str(), "INFY.NS");
        assert_eq!(ds.records()[2].close, dec!(104));
    }

    #[test]
    fn test_latest_timestamp_per_instrument() {
        let ds = Dataset::from_records(vec![
            record("TCS.NS", 5, dec!(1)),
            record("INFY.NS", 7, dec!(1)),
        ]);
        let tcs = Instrument::new("TCS.NS");

        assert_eq!(
            ds.latest_timestamp(Some(&tcs)),
            Some(Utc.with_ymd_and_hms(2024, 6, 3, 5, 0, 0).unwrap())
        );
        assert_eq!(
            ds.latest_timestamp(None),
            Some(Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap())
        );
        assert_eq!(ds.latest_timestamp(Some(&Instrument::new("WIPRO.NS"))), None);
    }

    #[test]
    fn test_summary() {
        let ds = Dataset::from_records(vec![
            record("TCS.NS", 5, dec!(1)),
            record("TCS.NS", 6, dec!(1)),
            record("INFY.NS", 7, dec!(1)),
        ]);
        let summary = ds.summary();

        assert_eq!(summary.records, 3);
        assert_eq!(summary.instruments, 2);
        assert_eq!(summary.first, Some(Utc.with_ymd_and_hms(2024, 6, 3, 5, 0, 0).unwrap()));
        assert_eq!(summary.last, Some(Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap()));
        assert_eq!(Dataset::new().summary(), DatasetSummary::default());
    }

    #[test]
    fn test_filter_by_instrument_and_range() {
        let ds = Dataset::from_records(vec![
            record("INFY.NS", 4, dec!(1)),
            record("TCS.NS", 4, dec!(2)),
            record("TCS.NS", 5, dec!(3)),
            record("TCS.NS", 6, dec!(4)),
        ]);
        let tcs = [Instrument::new("TCS.NS")];
        let at = |hour| Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap();

        let only_tcs = ds.filter(Some(&tcs[..]), ..);
        assert_eq!(only_tcs.len(), 3);
        assert_eq!(only_tcs.instruments().len(), 1);

        let window = ds.filter(Some(&tcs[..]), at(5)..at(6));
        assert_eq!(window.len(), 1);
        assert_eq!(window.records()[0].close, dec!(3));

        // 빈 종목 목록은 전체
        let empty: Vec<Instrument> = Vec::new();
        assert_eq!(ds.filter(Some(empty.as_slice()), at(4)..=at(4)).len(), 2);
        assert!(ds.filter(None, at(7)..).is_empty());
    }
}
