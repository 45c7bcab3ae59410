//! # 수업 계획(planeaciones) 데이터베이스 쿼리 모듈
//!
//! `planeaciones` 테이블에 대한 CRUD 쿼리 함수들입니다.
//!
//! 모든 조회·수정·삭제는 `user_id`로 필터링됩니다.
//! 다른 사용자의 행은 "존재하지 않는 행"과 똑같이 보이므로,
//! 라우트 핸들러는 두 경우 모두 404를 반환합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::PgPool;
use uuid::Uuid;

/// 사용자의 수업 계획을 최신순으로 한 페이지 조회합니다.
///
/// # 반환값
/// `(해당 페이지의 행들, 사용자의 전체 행 수)`
pub async fn list_plans(
    pool: &PgPool,
    user_id: Uuid,
    page: Page,
) -> Result<(Vec<LessonPlan>, i64), AppError> {
    let plans = sqlx::query_as::<_, LessonPlan>(
        r#"
        SELECT id, user_id, batch_id, materia, nivel, unidad, tema, subtema,
               duracion, sesiones, tabla_ia, fecha_creacion
        FROM planeaciones
        WHERE user_id = $1
        ORDER BY fecha_creacion DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    // query_scalar: 첫 번째 컬럼 하나만 꺼내는 쿼리
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM planeaciones WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok((plans, total))
}

/// 사용자 소유의 수업 계획 하나를 조회합니다.
pub async fn get_plan(
    pool: &PgPool,
    user_id: Uuid,
    id: i64,
) -> Result<Option<LessonPlan>, AppError> {
    let plan = sqlx::query_as::<_, LessonPlan>(
        r#"
        SELECT id, user_id, batch_id, materia, nivel, unidad, tema, subtema,
               duracion, sesiones, tabla_ia, fecha_creacion
        FROM planeaciones
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(plan)
}

/// 새 수업 계획을 삽입하고, 저장소가 채운 id/fecha_creacion을 포함한 행을 반환합니다.
pub async fn create_plan(pool: &PgPool, plan: &NewLessonPlan) -> Result<LessonPlan, AppError> {
    // RETURNING: INSERT 결과 행을 바로 돌려받아 재조회가 필요 없습니다.
    let created = sqlx::query_as::<_, LessonPlan>(
        r#"
        INSERT INTO planeaciones
            (user_id, batch_id, materia, nivel, unidad, tema, subtema, duracion, sesiones, tabla_ia)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, user_id, batch_id, materia, nivel, unidad, tema, subtema,
                  duracion, sesiones, tabla_ia, fecha_creacion
        "#,
    )
    .bind(plan.user_id)
    .bind(plan.batch_id)
    .bind(&plan.materia)
    .bind(&plan.nivel)
    .bind(&plan.unidad)
    .bind(&plan.tema)
    .bind(&plan.subtema)
    .bind(plan.duracion)
    .bind(plan.sesiones)
    .bind(&plan.tabla_ia)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// 수업 계획을 부분 수정합니다.
///
/// `COALESCE($n, column)`: 바인딩 값이 NULL(= 변경 안 함)이면 기존 값을 유지합니다.
///
/// # 반환값
/// - `Ok(Some(LessonPlan))`: 수정된 행
/// - `Ok(None)`: 해당 사용자 소유의 행이 없음
pub async fn update_plan(
    pool: &PgPool,
    user_id: Uuid,
    id: i64,
    changes: &LessonPlanChanges,
) -> Result<Option<LessonPlan>, AppError> {
    let plan = sqlx::query_as::<_, LessonPlan>(
        r#"
        UPDATE planeaciones
        SET materia  = COALESCE($3, materia),
            nivel    = COALESCE($4, nivel),
            unidad   = COALESCE($5, unidad),
            tema     = COALESCE($6, tema),
            subtema  = COALESCE($7, subtema),
            duracion = COALESCE($8, duracion),
            sesiones = COALESCE($9, sesiones),
            tabla_ia = COALESCE($10, tabla_ia)
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, batch_id, materia, nivel, unidad, tema, subtema,
                  duracion, sesiones, tabla_ia, fecha_creacion
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&changes.materia)
    .bind(&changes.nivel)
    .bind(&changes.unidad)
    .bind(&changes.tema)
    .bind(&changes.subtema)
    .bind(changes.duracion)
    .bind(changes.sesiones)
    .bind(&changes.tabla_ia)
    .fetch_optional(pool)
    .await?;

    Ok(plan)
}

/// 수업 계획을 삭제합니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 사용자 소유의 행이 없음
pub async fn delete_plan(pool: &PgPool, user_id: Uuid, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM planeaciones WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── 배치(batch) 관련 쿼리 ──

/// 사용자의 배치 목록을 batch_id별로 묶어 행 수와 함께 조회합니다 (최근 배치 먼저).
pub async fn list_batches(pool: &PgPool, user_id: Uuid) -> Result<Vec<BatchSummary>, AppError> {
    let batches = sqlx::query_as::<_, BatchSummary>(
        r#"
        SELECT batch_id,
               COUNT(*)            AS total,
               MIN(materia)        AS materia,
               MIN(nivel)          AS nivel,
               MIN(unidad)         AS unidad,
               MIN(fecha_creacion) AS fecha_creacion
        FROM planeaciones
        WHERE user_id = $1 AND batch_id IS NOT NULL
        GROUP BY batch_id
        ORDER BY MIN(fecha_creacion) DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(batches)
}

/// 한 배치에 속한 사용자의 수업 계획을 생성 순서대로 조회합니다.
pub async fn list_batch(
    pool: &PgPool,
    user_id: Uuid,
    batch_id: Uuid,
) -> Result<Vec<LessonPlan>, AppError> {
    let plans = sqlx::query_as::<_, LessonPlan>(
        r#"
        SELECT id, user_id, batch_id, materia, nivel, unidad, tema, subtema,
               duracion, sesiones, tabla_ia, fecha_creacion
        FROM planeaciones
        WHERE user_id = $1 AND batch_id = $2
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .bind(batch_id)
    .fetch_all(pool)
    .await?;

    Ok(plans)
}
