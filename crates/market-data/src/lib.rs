//! 시장 데이터 제공자/저장소 어댑터와 병합 로직.
//!
//! 이 crate는 다음을 제공합니다:
//! - `DataProvider`: 외부 OHLCV 데이터 제공자 추상화와 Yahoo Finance 구현
//! - `DurableStore`: 타임프레임별 데이터셋 저장소 추상화와 CSV/메모리 구현
//! - `merge_and_persist`: 추가-중복제거/전체교체 병합 후 저장

pub mod error;
pub mod merge;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use merge::{merge_and_persist, merge_datasets, MergeOutcome};
pub use provider::{DataProvider, FetchReport, SymbolFailure, YahooProvider};
pub use storage::{CsvFileStore, DurableStore, MemoryStore};
