//! 타임프레임별 CSV 파일 저장소.
//!
//! 파일 구성:
//! - `{prefix}_{timeframe}.csv`: 현재 데이터셋
//! - `{prefix}_{timeframe}_{YYYYMMDD}.csv`: 날짜별 백업 스냅샷
//!
//! 쓰기는 임시 파일에 기록한 뒤 rename으로 교체하므로, 실패한 쓰기는 기존 파일을
//! 건드리지 않습니다.

use super::DurableStore;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use market_core::{DataRecord, Dataset, Instrument, StorageConfig, Timeframe};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CSV 한 행.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Datetime")]
    datetime: DateTime<Utc>,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Open", with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(rename = "High", with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(rename = "Low", with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(rename = "Close", with = "rust_decimal::serde::str")]
    close: Decimal,
    #[serde(rename = "Volume", with = "rust_decimal::serde::str")]
    volume: Decimal,
}

impl From<&DataRecord> for CsvRow {
    fn from(r: &DataRecord) -> Self {
        Self {
            datetime: r.timestamp,
            symbol: r.instrument.to_string(),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        }
    }
}

impl From<CsvRow> for DataRecord {
    fn from(row: CsvRow) -> Self {
        DataRecord::new(
            Instrument::new(row.symbol),
            row.datetime,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
        )
    }
}

/// CSV 파일 저장소.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    data_dir: PathBuf,
    prefix: String,
    backups: bool,
}

impl CsvFileStore {
    pub fn new(data_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            prefix: prefix.into(),
            backups: false,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.data_dir.clone(), config.file_prefix.clone()).with_backups(config.backups)
    }

    /// 쓰기 성공 시 날짜별 백업 스냅샷을 남길지 설정합니다.
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups = enabled;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 현재 데이터셋 파일 경로.
    pub fn file_path(&self, timeframe: Timeframe) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.csv", self.prefix, timeframe))
    }

    /// 날짜별 백업 파일 경로.
    pub fn backup_path(&self, timeframe: Timeframe, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!(
            "{}_{}_{}.csv",
            self.prefix,
            timeframe,
            date.format("%Y%m%d")
        ))
    }

    /// 백업 파일명에서 날짜를 추출합니다. 이 저장소의 백업 파일이 아니면 `None`.
    fn backup_date(&self, file_name: &str) -> Option<NaiveDate> {
        let stem = file_name.strip_suffix(".csv")?;
        let rest = stem.strip_prefix(&self.prefix)?.strip_prefix('_')?;
        let (timeframe, date) = rest.rsplit_once('_')?;
        Timeframe::from_interval(timeframe)?;
        if date.len() != 8 {
            return None;
        }
        NaiveDate::parse_from_str(date, "%Y%m%d").ok()
    }

    /// `cutoff`보다 이전 날짜의 백업 파일을 삭제합니다.
    pub fn remove_backups_before(&self, cutoff: NaiveDate) -> Result<usize> {
        if !self.data_dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(|n| self.backup_date(n)) else {
                continue;
            };
            if date < cutoff {
                match fs::remove_file(entry.path()) {
                    Ok(()) => {
                        debug!(file = ?entry.path(), "오래된 백업 삭제");
                        removed += 1;
                    }
                    Err(e) => warn!(file = ?entry.path(), error = %e, "백업 삭제 실패"),
                }
            }
        }
        Ok(removed)
    }

    fn read_file(path: &Path) -> Result<Dataset> {
        if !path.exists() {
            return Ok(Dataset::new());
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            records.push(DataRecord::from(row?));
        }
        Ok(Dataset::from_records(records))
    }

    fn write_file(path: &Path, dataset: &Dataset) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| DataError::StoreUnavailable(format!("잘못된 경로: {}", path.display())))?;
        fs::create_dir_all(dir)?;

        let tmp = path.with_extension("csv.tmp");
        let result = Self::write_rows(&tmp, dataset).and_then(|()| {
            fs::rename(&tmp, path)?;
            Ok(())
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn write_rows(path: &Path, dataset: &Dataset) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if dataset.is_empty() {
            writer.write_record(["Datetime", "Symbol", "Open", "High", "Low", "Close", "Volume"])?;
        }
        for record in dataset.records() {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// 블로킹 파일 작업을 별도 스레드에서 실행합니다.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DataError::StoreUnavailable(format!("파일 작업 중단: {}", e)))?
}

#[async_trait]
impl DurableStore for CsvFileStore {
    fn name(&self) -> &str {
        "csv_file"
    }

    async fn read(&self, timeframe: Timeframe) -> Result<Dataset> {
        let path = self.file_path(timeframe);
        blocking(move || Self::read_file(&path)).await
    }

    async fn write(&self, timeframe: Timeframe, dataset: &Dataset) -> Result<()> {
        let path = self.file_path(timeframe);
        let backup = self
            .backups
            .then(|| self.backup_path(timeframe, Utc::now().date_naive()));
        let dataset = dataset.clone();
        let records = dataset.len();

        blocking(move || {
            Self::write_file(&path, &dataset)?;
            if let Some(backup) = backup {
                if let Err(e) = fs::copy(&path, &backup) {
                    warn!(file = ?backup, error = %e, "백업 스냅샷 작성 실패");
                }
            }
            Ok(())
        })
        .await?;

        info!(timeframe = %timeframe, records, "데이터셋 저장 완료");
        Ok(())
    }

    async fn retention_cleanup(&self, max_age: chrono::Duration) -> Result<usize> {
        let cutoff = Utc::now().date_naive() - max_age;
        let store = self.clone();
        let removed = blocking(move || store.remove_backups_before(cutoff)).await?;
        if removed > 0 {
            info!(removed, %cutoff, "보관 기간 정리 완료");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let store = CsvFileStore::new("/data", "market_data");
        assert_eq!(store.file_path(Timeframe::W1), PathBuf::from("/data/market_data_1wk.csv"));
        assert_eq!(
            store.backup_path(Timeframe::M15, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
            PathBuf::from("/data/market_data_15m_20240603.csv")
        );
    }

    #[test]
    fn test_backup_date_parsing() {
        let store = CsvFileStore::new("/data", "market_data");
        assert_eq!(
            store.backup_date("market_data_1d_20240603.csv"),
            NaiveDate::from_ymd_opt(2024, 6, 3)
        );
        assert_eq!(store.backup_date("market_data_1d.csv"), None);
        assert_eq!(store.backup_date("market_data_4h_20240603.csv"), None);
        assert_eq!(store.backup_date("other_1d_20240603.csv"), None);
        assert_eq!(store.backup_date("market_data_1d_2024060.csv"), None);
    }
}
