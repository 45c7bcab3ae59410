//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인
//! - `planeaciones`: 수업 계획 CRUD와 엑셀 내보내기
//! - `generation`: AI 생성과 배치 조회

pub mod generation;
pub mod health;
pub mod planeaciones;

pub use generation::*;
pub use health::*;
pub use planeaciones::*;

use crate::error::AppError;

/// 경로의 `{id}`를 숫자 ID로 바꿉니다. 숫자가 아니면 그런 행은 없는 것이므로 404입니다.
pub(crate) fn parse_plan_id(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| AppError::NotFound)
}
