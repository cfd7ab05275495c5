//! 핵심 도메인 에러 타입.
//!
//! 설정 로드, 캘린더 계산, 문자열 파싱 중 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 시간대
    #[error("알 수 없는 시간대: {0}")]
    InvalidTimezone(String),

    /// 캘린더 계산 에러
    #[error("캘린더 에러: {0}")]
    Calendar(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 핵심 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 설정 파일 수정으로 해결해야 하는 에러인지 확인합니다.
    pub fn is_config(&self) -> bool {
        matches!(self, CoreError::Config(_) | CoreError::InvalidTimezone(_))
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<chrono::ParseError> for CoreError {
    fn from(err: chrono::ParseError) -> Self {
        CoreError::Parse(err.to_string())
    }
}
