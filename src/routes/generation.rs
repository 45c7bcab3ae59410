//! # AI 생성 및 배치 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/planeaciones/generate`            → 주제별 수업 계획 생성 (배치)
//! - `GET  /api/planeaciones/batches`             → 배치 목록 (batch_id별 행 수)
//! - `GET  /api/planeaciones/batch/{batch_id}`    → 한 배치의 모든 행

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    services::generation::generate_batch,
    state::AppState,
};

/// `POST /api/planeaciones/generate`
///
/// 요청: `{materia, nivel, unidad, temas: [{tema, duracion}, ...]}`
/// 응답: `201 {batch_id, total, planeaciones: [...]}`
///
/// 모든 주제를 먼저 검증하므로, 하나라도 잘못되면 모델을 호출하기 전에 400을 반환합니다.
pub async fn generate_planeaciones(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerationResponse>), AppError> {
    let Json(req) = payload?;
    let batch = req.validate()?;

    let outcome = generate_batch(
        state.store.as_ref(),
        state.model.as_ref(),
        user.user_id,
        &batch,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerationResponse {
            batch_id: outcome.batch_id,
            total: outcome.plans.len(),
            planeaciones: outcome.plans,
        }),
    ))
}

/// `GET /api/planeaciones/batches`
pub async fn list_batches(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<BatchSummary>>, AppError> {
    let batches = state.store.list_batches(user.user_id).await?;
    Ok(Json(batches))
}

/// `GET /api/planeaciones/batch/{batch_id}`
///
/// 생성 응답과 같은 모양으로 돌려줍니다. 호출자 소유의 행이 없으면 404입니다.
pub async fn get_batch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(batch_id): Path<String>,
) -> Result<Json<GenerationResponse>, AppError> {
    let batch_id = Uuid::parse_str(batch_id.trim()).map_err(|_| AppError::NotFound)?;

    let plans = state.store.list_batch(user.user_id, batch_id).await?;
    if plans.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(GenerationResponse {
        batch_id,
        total: plans.len(),
        planeaciones: plans,
    }))
}
