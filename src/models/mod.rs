//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `planeacion`: 저장된 수업 계획 행과 생성/수정/목록 요청
//! - `generation`: AI 생성 요청과 검증된 `LessonPlanRequest`, 생성 표의 한 행
//! - `metrics`: AI 호출 텔레메트리 행
//!
//! 요청 구조체는 경계에서 한 번 검증되어 강타입 구조체로 바뀝니다.
//! 검증에 쓰이는 공통 헬퍼도 이 모듈에 있습니다.

pub mod generation;
pub mod metrics;
pub mod planeacion;

pub use generation::*;
pub use metrics::*;
pub use planeacion::*;

use serde::Deserialize;

use crate::error::AppError;

/// 수업 시간(분)의 허용 범위
pub const MIN_DURATION_MINUTES: u32 = 10;
pub const MAX_DURATION_MINUTES: u32 = 600;
/// 한 수업 계획의 최대 세션 수
pub const MAX_SESSIONS: u32 = 50;

/// 숫자 또는 문자열로 올 수 있는 필드 (`"unidad": 1` 과 `"unidad": "1"` 모두 허용)
///
/// 프론트엔드 폼은 숫자를 문자열로 보내는 경우가 많습니다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flexible {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Flexible {
    /// 표시용 문자열. 빈 문자열은 None입니다.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Flexible::Int(n) => Some(n.to_string()),
            Flexible::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Flexible::Float(f) => Some(f.to_string()),
            Flexible::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }

    /// 정수로 해석할 수 있으면 그 값을 반환합니다. `"45"`, `45`, `45.0`은 모두 45입니다.
    pub fn as_whole_number(&self) -> Option<i64> {
        match self {
            Flexible::Int(n) => Some(*n),
            Flexible::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Flexible::Float(_) => None,
            Flexible::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// 필수 문자열 필드: 앞뒤 공백을 제거하고 비어 있으면 400
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::bad_request(format!(
            "El campo '{}' es obligatorio",
            field
        ))),
    }
}

/// 선택 문자열 필드: 공백뿐이면 None
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 수업 시간(분) 검증: 필수, 정수, MIN..=MAX
pub(crate) fn validate_duration(field: &str, value: Option<&Flexible>) -> Result<u32, AppError> {
    let minutes = value
        .ok_or_else(|| AppError::bad_request(format!("El campo '{}' es obligatorio", field)))?
        .as_whole_number()
        .ok_or_else(|| {
            AppError::bad_request(format!("'{}' debe ser un número entero de minutos", field))
        })?;

    if minutes < i64::from(MIN_DURATION_MINUTES) || minutes > i64::from(MAX_DURATION_MINUTES) {
        return Err(AppError::bad_request(format!(
            "'{}' debe estar entre {} y {} minutos",
            field, MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )));
    }
    Ok(minutes as u32)
}

/// 세션 수 검증: 선택, 있으면 1..=MAX_SESSIONS
pub(crate) fn validate_sessions(field: &str, value: Option<&Flexible>) -> Result<Option<u32>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.as_whole_number() {
        Some(n) if n >= 1 && n <= i64::from(MAX_SESSIONS) => Ok(Some(n as u32)),
        _ => Err(AppError::bad_request(format!(
            "'{}' debe ser un entero entre 1 y {}",
            field, MAX_SESSIONS
        ))),
    }
}
