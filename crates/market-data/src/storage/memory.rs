//! 프로세스 내 메모리 저장소.

use super::DurableStore;
use crate::error::Result;
use async_trait::async_trait;
use market_core::{Dataset, Timeframe};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// 메모리 저장소.
///
/// 파일을 남기지 않는 드라이런과 테스트에 사용합니다. 보관 기간 정리는
/// 스냅샷을 만들지 않으므로 항상 0건입니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: RwLock<HashMap<Timeframe, Dataset>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 데이터셋을 가진 저장소를 생성합니다.
    pub fn with_dataset(timeframe: Timeframe, dataset: Dataset) -> Self {
        let mut datasets = HashMap::new();
        datasets.insert(timeframe, dataset);
        Self {
            datasets: RwLock::new(datasets),
            writes: AtomicUsize::new(0),
        }
    }

    /// 지금까지 성공한 쓰기 횟수.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read(&self, timeframe: Timeframe) -> Result<Dataset> {
        Ok(self
            .datasets
            .read()
            .await
            .get(&timeframe)
            .cloned()
            .unwrap_or_default())
    }

    async fn write(&self, timeframe: Timeframe, dataset: &Dataset) -> Result<()> {
        self.datasets.write().await.insert(timeframe, dataset.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn retention_cleanup(&self, _max_age: chrono::Duration) -> Result<usize> {
        Ok(0)
    }
}
