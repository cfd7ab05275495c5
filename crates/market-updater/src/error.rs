//! 갱신 스케줄러 에러 타입.

use thiserror::Error;

/// 스케줄러 에러.
///
/// 일부 종목의 조회 실패, 갱신 시점 아님, 선택된 종목 없음, 중복 트리거 병합은
/// 에러가 아니라 `CycleOutcome`으로 표현됩니다.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// 데이터 제공자를 사용할 수 없음 (`start()` 실패)
    #[error("데이터 제공자 사용 불가: {0}")]
    ProviderUnavailable(String),

    /// 요청한 전체 종목 조회 실패 (갱신 상태는 변경되지 않음)
    #[error("전체 조회 실패: {0}")]
    FetchTotalFailure(String),

    /// 병합 결과 저장 실패 (이전 데이터셋 유지, 갱신 상태는 변경되지 않음)
    #[error("저장 실패: {0}")]
    PersistFailure(String),

    /// 종목 선택 중 저장소 조회 실패
    #[error("저장소 조회 실패: {0}")]
    StoreUnavailable(String),

    /// 현재 상태에서 허용되지 않는 작업
    #[error("잘못된 상태: {0}")]
    InvalidState(String),

    /// 등록되지 않았거나 비활성화된 타임프레임
    #[error("알 수 없는 타임프레임: {0}")]
    UnknownTimeframe(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

impl UpdateError {
    /// 다음 트리거에서 자연스럽게 재시도되는 사이클 단위 실패인지 확인합니다.
    pub fn is_cycle_failure(&self) -> bool {
        matches!(
            self,
            UpdateError::FetchTotalFailure(_)
                | UpdateError::PersistFailure(_)
                | UpdateError::StoreUnavailable(_)
        )
    }
}

impl From<market_core::CoreError> for UpdateError {
    fn from(err: market_core::CoreError) -> Self {
        UpdateError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_failure_classification() {
        assert!(UpdateError::FetchTotalFailure("timeout".into()).is_cycle_failure());
        assert!(UpdateError::PersistFailure("disk full".into()).is_cycle_failure());
        assert!(!UpdateError::ProviderUnavailable("down".into()).is_cycle_failure());
    }
}
