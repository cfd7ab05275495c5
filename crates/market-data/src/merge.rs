//! 데이터셋 병합 및 저장.
//!
//! - `AppendDedup`: 기존 데이터셋 + 새 레코드, `(instrument, timestamp)` 중복은 새 레코드 우선
//! - `FullReplace`: 기존 데이터셋을 버리고 새 레코드만 저장
//!
//! 두 방식 모두 결과는 `(instrument, timestamp)` 순으로 정렬됩니다.

use crate::error::Result;
use crate::storage::DurableStore;
use market_core::{Dataset, MergeMode, Timeframe};
use serde::Serialize;
use tracing::debug;

/// 병합 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub mode: MergeMode,
    /// 저장소에 실제로 기록했는지 여부
    pub written: bool,
    /// 병합 전 저장된 레코드 수 (전체 교체 모드에서는 읽지 않으므로 0)
    pub records_before: usize,
    /// 병합 후 레코드 수
    pub records_after: usize,
    /// 입력으로 받은 새 레코드 수
    pub new_records: usize,
}

impl MergeOutcome {
    fn unchanged(mode: MergeMode) -> Self {
        Self {
            mode,
            written: false,
            records_before: 0,
            records_after: 0,
            new_records: 0,
        }
    }
}

/// 기존 데이터셋과 새 레코드를 병합합니다 (저장하지 않음).
pub fn merge_datasets(existing: Dataset, new_records: Dataset, mode: MergeMode) -> Dataset {
    match mode {
        MergeMode::AppendDedup => {
            let mut combined = existing;
            combined.extend(new_records);
            combined.normalize()
        }
        MergeMode::FullReplace => new_records.normalize(),
    }
}

/// 새 레코드를 저장된 데이터셋에 병합하고 저장합니다.
///
/// 새 레코드가 비어 있으면 저장소를 건드리지 않고 성공을 반환합니다.
/// 쓰기가 실패하면 에러를 그대로 반환하며, 저장소에는 이전 데이터셋이 남습니다.
pub async fn merge_and_persist(
    store: &dyn DurableStore,
    timeframe: Timeframe,
    new_records: Dataset,
    mode: MergeMode,
) -> Result<MergeOutcome> {
    if new_records.is_empty() {
        debug!(timeframe = %timeframe, "병합할 새 레코드 없음");
        return Ok(MergeOutcome::unchanged(mode));
    }

    let new_count = new_records.len();
    let existing = match mode {
        MergeMode::AppendDedup => store.read(timeframe).await?,
        MergeMode::FullReplace => Dataset::new(),
    };
    let records_before = existing.len();

    let merged = merge_datasets(existing, new_records, mode);
    store.write(timeframe, &merged).await?;

    debug!(
        timeframe = %timeframe,
        mode = %mode,
        records_before,
        records_after = merged.len(),
        new_records = new_count,
        "병합 저장 완료"
    );

    Ok(MergeOutcome {
        mode,
        written: true,
        records_before,
        records_after: merged.len(),
        new_records: new_count,
    })
}
