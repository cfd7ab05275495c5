//! 영속 저장소 추상화 및 구현.
//!
//! - `CsvFileStore`: 타임프레임별 CSV 파일 저장소
//! - `MemoryStore`: 프로세스 내 저장소 (드라이런/테스트용)

pub mod csv_file;
pub mod memory;

pub use csv_file::CsvFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{Dataset, DatasetSummary, Instrument, Timeframe};

/// 타임프레임별 데이터셋을 보관하는 영속 저장소.
///
/// `write`는 전부 반영되거나 전혀 반영되지 않아야 합니다. 실패한 쓰기 이후에도
/// `read`는 직전에 성공적으로 기록된 데이터셋을 반환해야 합니다.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// 저장소 이름 (로그용).
    fn name(&self) -> &str;

    /// 타임프레임 데이터셋을 읽습니다. 기록된 적이 없으면 빈 데이터셋입니다.
    async fn read(&self, timeframe: Timeframe) -> Result<Dataset>;

    /// 타임프레임 데이터셋 전체를 기록합니다.
    async fn write(&self, timeframe: Timeframe, dataset: &Dataset) -> Result<()>;

    /// 가장 최근 레코드 시각. `instrument`가 주어지면 해당 종목으로 한정합니다.
    async fn latest_timestamp(
        &self,
        timeframe: Timeframe,
        instrument: Option<&Instrument>,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read(timeframe).await?.latest_timestamp(instrument))
    }

    /// `max_age`보다 오래된 보관 데이터를 삭제하고 삭제한 항목 수를 반환합니다.
    async fn retention_cleanup(&self, max_age: chrono::Duration) -> Result<usize>;

    /// 데이터셋 요약.
    async fn summary(&self, timeframe: Timeframe) -> Result<DatasetSummary> {
        Ok(self.read(timeframe).await?.summary())
    }
}
