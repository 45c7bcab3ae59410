//! # 수업 계획(planeación) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/planeaciones`                     → 내 수업 계획 목록 (최신순, 페이지)
//! - `POST   /api/planeaciones`                     → AI 없이 직접 저장
//! - `GET    /api/planeaciones/{id}`                → 단일 조회
//! - `PUT    /api/planeaciones/{id}`                → 부분 수정
//! - `DELETE /api/planeaciones/{id}`                → 삭제
//! - `GET    /api/planeaciones/{id}/export/excel`   → 엑셀 파일 다운로드
//!
//! 모든 핸들러는 `AuthUser` 추출기로 호출자를 확인하고,
//! 저장소 호출을 호출자의 `user_id`로 제한합니다.
//! 다른 사용자의 행은 403이 아니라 404로 응답합니다 (존재 여부를 노출하지 않음).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::parse_plan_id,
    services::export::{export_file_name, render_plan_xlsx, XLSX_CONTENT_TYPE},
    state::AppState,
};

/// `GET /api/planeaciones?page=1&limit=20` — 호출자의 수업 계획 목록
///
/// 본문은 행 배열이고, 전체 행 수는 `X-Total-Count` 헤더로 알려줍니다.
pub async fn list_planeaciones(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let page = query.page()?;

    let (plans, total) = state.store.list_plans(user.user_id, page).await?;
    Ok(([("x-total-count", total.to_string())], Json(plans)))
}

/// `GET /api/planeaciones/{id}` — 단일 조회
pub async fn get_planeacion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LessonPlan>, AppError> {
    let id = parse_plan_id(&id)?;
    let plan = state
        .store
        .get_plan(user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(plan))
}

/// `POST /api/planeaciones` — 직접 저장
///
/// 응답: `201 { "id": 42 }`
pub async fn create_planeacion(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateLessonPlanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(req) = payload?;
    let new_plan = req.into_new_plan(user.user_id)?;

    let plan = state.store.create_plan(&new_plan).await?;
    tracing::info!(plan_id = plan.id, user_id = %user.user_id, "Lesson plan created");
    Ok((StatusCode::CREATED, Json(json!({ "id": plan.id }))))
}

/// `PUT /api/planeaciones/{id}` — 보낸 필드만 수정
pub async fn update_planeacion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateLessonPlanRequest>, JsonRejection>,
) -> Result<Json<LessonPlan>, AppError> {
    let id = parse_plan_id(&id)?;
    let Json(req) = payload?;
    let changes = req.into_changes()?;

    let plan = state
        .store
        .update_plan(user.user_id, id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(plan))
}

/// `DELETE /api/planeaciones/{id}` — 삭제
pub async fn delete_planeacion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_plan_id(&id)?;
    if !state.store.delete_plan(user.user_id, id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(plan_id = id, user_id = %user.user_id, "Lesson plan deleted");
    Ok(Json(json!({ "message": "Planeación eliminada" })))
}

/// `GET /api/planeaciones/{id}/export/excel` — xlsx 다운로드
pub async fn export_planeacion_excel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_plan_id(&id)?;
    let plan = state
        .store
        .get_plan(user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let bytes = render_plan_xlsx(&plan)?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&plan));

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
