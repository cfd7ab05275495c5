//! 갱신 사이클 결과와 통계.

use market_core::Timeframe;
use market_data::{MergeOutcome, SymbolFailure};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// 사이클 실행 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// 트리거에 의한 정기 실행
    Scheduled,
    /// 시작 시 빈 데이터셋 보충 (시간/선택 게이트 생략)
    CatchUp,
    /// 운영자 요청 (시간/선택 게이트 생략)
    Manual,
}

impl RunMode {
    /// 정책의 시간/선택 게이트를 생략하는 모드인지 확인합니다.
    pub fn bypasses_gates(&self) -> bool {
        !matches!(self, RunMode::Scheduled)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Scheduled => f.write_str("scheduled"),
            RunMode::CatchUp => f.write_str("catch_up"),
            RunMode::Manual => f.write_str("manual"),
        }
    }
}

/// 사이클 결과. 에러가 아닌 모든 종료 경로를 나타냅니다.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// 같은 타임프레임의 사이클이 실행 중이라 버려짐
    Coalesced,
    /// 정책상 갱신 시점이 아님
    NotDue,
    /// 갱신할 종목이 없음
    EmptySelection,
    /// 조회/병합/저장 완료
    Updated(CycleStats),
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Coalesced => "coalesced",
            CycleOutcome::NotDue => "not_due",
            CycleOutcome::EmptySelection => "empty_selection",
            CycleOutcome::Updated(stats) if stats.is_partial() => "partial",
            CycleOutcome::Updated(_) => "updated",
        }
    }

    /// 실제로 조회와 저장 단계를 거쳤는지 확인합니다.
    pub fn is_updated(&self) -> bool {
        matches!(self, CycleOutcome::Updated(_))
    }

    pub fn stats(&self) -> Option<&CycleStats> {
        match self {
            CycleOutcome::Updated(stats) => Some(stats),
            _ => None,
        }
    }
}

/// 완료된 사이클 통계.
#[derive(Debug, Clone, Serialize)]
pub struct CycleStats {
    pub timeframe: Timeframe,
    pub mode: RunMode,
    /// 요청한 종목 수
    pub requested: usize,
    /// 레코드를 받은 종목 수
    pub fetched: usize,
    /// 조회에 실패한 종목
    pub failed_symbols: Vec<SymbolFailure>,
    /// 제공자가 반환한 레코드 수
    pub records_fetched: usize,
    pub merge: MergeOutcome,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleStats {
    pub fn is_partial(&self) -> bool {
        !self.failed_symbols.is_empty()
    }

    /// 조회 성공률 (%)
    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            (self.fetched as f64 / self.requested as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            timeframe = %self.timeframe,
            mode = %self.mode,
            total = self.requested,
            fetched = self.fetched,
            failed_symbols = self.failed_symbols.len(),
            records_fetched = self.records_fetched,
            records_written = self.merge.records_after,
            written = self.merge.written,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 사이클 완료"
        );
    }
}
