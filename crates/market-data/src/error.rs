//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 제공자 및 저장소 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 외부 데이터 소스 요청 실패
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 요청한 모든 종목의 조회가 실패
    #[error("All {requested} symbols failed: {reason}")]
    TotalFetchFailure { requested: usize, reason: String },

    /// 응답 파싱 실패
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 저장소 사용 불가
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<market_core::CoreError> for DataError {
    fn from(err: market_core::CoreError) -> Self {
        DataError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
