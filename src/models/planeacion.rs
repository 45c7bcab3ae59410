use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    optional_text, required_text, validate_duration, validate_sessions, Flexible,
};

/// 저장된 수업 계획 한 건 (`planeaciones` 테이블의 한 행)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonPlan {
    pub id: i64,
    pub user_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub materia: String,
    pub nivel: String,
    pub unidad: Option<String>,
    pub tema: String,
    pub subtema: Option<String>,
    pub duracion: i32,
    pub sesiones: Option<i32>,
    pub tabla_ia: Value,
    pub fecha_creacion: DateTime<Utc>,
}

/// 저장소에 삽입할 새 행. id와 fecha_creacion은 저장소가 채웁니다.
#[derive(Debug, Clone)]
pub struct NewLessonPlan {
    pub user_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub materia: String,
    pub nivel: String,
    pub unidad: Option<String>,
    pub tema: String,
    pub subtema: Option<String>,
    pub duracion: i32,
    pub sesiones: Option<i32>,
    pub tabla_ia: Value,
}

/// 부분 수정 내용. `None`인 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonPlanChanges {
    pub materia: Option<String>,
    pub nivel: Option<String>,
    pub unidad: Option<String>,
    pub tema: Option<String>,
    pub subtema: Option<String>,
    pub duracion: Option<i32>,
    pub sesiones: Option<i32>,
    pub tabla_ia: Option<Value>,
}

impl LessonPlanChanges {
    pub fn is_empty(&self) -> bool {
        *self == LessonPlanChanges::default()
    }
}

/// 하나의 배치(batch_id)로 묶인 수업 계획 요약
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub total: i64,
    pub materia: String,
    pub nivel: String,
    pub unidad: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

/// `POST /api/planeaciones` 요청 본문 (AI 생성 없이 직접 저장)
///
/// 초기 버전 클라이언트는 `grado`, `detalles_completos`라는 이름을 썼으므로 별칭으로 받습니다.
#[derive(Debug, Deserialize)]
pub struct CreateLessonPlanRequest {
    pub materia: Option<String>,
    #[serde(alias = "grado")]
    pub nivel: Option<String>,
    pub unidad: Option<Flexible>,
    pub tema: Option<String>,
    pub subtema: Option<String>,
    pub duracion: Option<Flexible>,
    pub sesiones: Option<Flexible>,
    #[serde(alias = "detalles_completos")]
    pub tabla_ia: Option<Value>,
}

impl CreateLessonPlanRequest {
    /// 요청을 검증하고 호출자 소유의 새 행으로 변환합니다.
    pub fn into_new_plan(self, user_id: Uuid) -> Result<NewLessonPlan, AppError> {
        let tabla_ia = match self.tabla_ia {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(table @ Value::Array(_)) => table,
            Some(_) => return Err(AppError::bad_request("'tabla_ia' debe ser un arreglo")),
        };

        Ok(NewLessonPlan {
            user_id,
            batch_id: None,
            materia: required_text("materia", self.materia)?,
            nivel: required_text("nivel", self.nivel)?,
            unidad: self.unidad.as_ref().and_then(Flexible::as_text),
            tema: required_text("tema", self.tema)?,
            subtema: optional_text(self.subtema),
            duracion: validate_duration("duracion", self.duracion.as_ref())? as i32,
            sesiones: validate_sessions("sesiones", self.sesiones.as_ref())?.map(|s| s as i32),
            tabla_ia,
        })
    }
}

/// `PUT /api/planeaciones/{id}` 요청 본문 (부분 업데이트)
///
/// 빠진 필드, `null`, 빈 문자열은 모두 "변경 없음"입니다.
/// 그래서 `subtema`, `unidad`, `sesiones`는 한번 저장되면 PUT으로 지울 수 없습니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLessonPlanRequest {
    pub materia: Option<String>,
    pub nivel: Option<String>,
    pub unidad: Option<Flexible>,
    pub tema: Option<String>,
    pub subtema: Option<String>,
    pub duracion: Option<Flexible>,
    pub sesiones: Option<Flexible>,
    pub tabla_ia: Option<Value>,
}

impl UpdateLessonPlanRequest {
    /// 보낸 필드만 검증해 변경 내용으로 만듭니다.
    /// 값이 없는 선택 필드는 기존 값을 유지합니다 (SQL `COALESCE`).
    /// 보낸 필드가 하나도 없으면 400을 반환합니다.
    pub fn into_changes(self) -> Result<LessonPlanChanges, AppError> {
        let non_empty = |field: &str, value: Option<String>| -> Result<Option<String>, AppError> {
            match value {
                Some(v) => required_text(field, Some(v)).map(Some),
                None => Ok(None),
            }
        };

        let duracion = match self.duracion {
            Some(ref d) => Some(validate_duration("duracion", Some(d))? as i32),
            None => None,
        };

        let tabla_ia = match self.tabla_ia {
            None | Some(Value::Null) => None,
            Some(table @ Value::Array(_)) => Some(table),
            Some(_) => return Err(AppError::bad_request("'tabla_ia' debe ser un arreglo")),
        };

        let changes = LessonPlanChanges {
            materia: non_empty("materia", self.materia)?,
            nivel: non_empty("nivel", self.nivel)?,
            unidad: self.unidad.as_ref().and_then(Flexible::as_text),
            tema: non_empty("tema", self.tema)?,
            subtema: optional_text(self.subtema),
            duracion,
            sesiones: validate_sessions("sesiones", self.sesiones.as_ref())?.map(|s| s as i32),
            tabla_ia,
        };

        if changes.is_empty() {
            return Err(AppError::bad_request("No se enviaron campos para actualizar"));
        }
        Ok(changes)
    }
}

/// 목록 조회 쿼리 파라미터 (`?page=2&limit=10`)
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// SQL LIMIT/OFFSET으로 바로 쓸 수 있는 페이지 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

impl ListQuery {
    pub fn page(&self) -> Result<Page, AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::bad_request("'page' debe ser mayor o igual a 1"));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppError::bad_request(format!(
                "'limit' debe estar entre 1 y {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Page {
            limit: i64::from(limit),
            offset: i64::from(page - 1) * i64::from(limit),
        })
    }
}
