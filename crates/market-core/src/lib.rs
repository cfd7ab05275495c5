//! # Market Core
//!
//! 시장 데이터 갱신 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다른 크레이트에서 공통으로 사용하는 기본 타입을 제공합니다:
//! - 타임프레임 및 병합 모드 정의
//! - 종목(Instrument) 및 종목 유니버스
//! - OHLCV 레코드와 데이터셋
//! - 거래소 세션 캘린더 (`MarketClock`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;
pub mod universe;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
