//! 도메인 모델.
//!
//! - `market_data`: OHLCV 레코드와 타임프레임별 데이터셋
//! - `calendar`: 거래소 세션 캘린더와 시간 소스

pub mod calendar;
pub mod market_data;

pub use calendar::*;
pub use market_data::*;
