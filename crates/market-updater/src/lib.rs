//! # Market Updater
//!
//! 거래소 세션을 고려해 타임프레임별 OHLCV 데이터를 주기적으로 갱신하는 스케줄러입니다.
//!
//! - 타임프레임별 갱신 정책 (장중, 일봉, 주봉, 스마트 선택)
//! - 간격/달력 트리거
//! - 타임프레임당 하나의 사이클만 실행 (중복 트리거는 병합)
//! - 시작 시 빈 데이터셋 보충, 수동 갱신, 상태 조회

pub mod error;
pub mod job;
pub mod policy;
pub mod scheduler;
pub mod stats;
pub mod status;
pub mod trigger;

pub use error::{Result, UpdateError};
pub use job::{JobRecord, JobState};
pub use policy::UpdatePolicy;
pub use scheduler::{ManualUpdateReport, UpdateScheduler};
pub use stats::{CycleOutcome, CycleStats, RunMode};
pub use status::{JobStatus, Lifecycle, SchedulerStatus};
pub use trigger::Trigger;
