//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 레코드 저장소와 직접 상호작용하는 코드를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `planeaciones`: 수업 계획 CRUD 및 배치 조회 쿼리
//! - `metrics`: AI 호출 텔레메트리 기록 쿼리
//!
//! 라우트 핸들러와 생성 파이프라인은 구체적인 DB가 아니라 `PlanStore` 트레이트에 의존합니다.
//! 운영 환경에서는 Postgres 풀을 감싼 `PgStore`를, 테스트에서는 메모리 저장소를 주입합니다.

pub mod metrics;
pub mod planeaciones;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;

/// 수업 계획 레코드 저장소
///
/// 모든 사용자 범위 연산은 `user_id`로 필터링해야 합니다.
/// `#[async_trait]`: `Arc<dyn PlanStore>`처럼 트레이트 객체로 쓰기 위해 필요합니다.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// 최신순 한 페이지와 전체 행 수
    async fn list_plans(&self, user_id: Uuid, page: Page)
        -> Result<(Vec<LessonPlan>, i64), AppError>;

    async fn get_plan(&self, user_id: Uuid, id: i64) -> Result<Option<LessonPlan>, AppError>;

    async fn create_plan(&self, plan: &NewLessonPlan) -> Result<LessonPlan, AppError>;

    async fn update_plan(
        &self,
        user_id: Uuid,
        id: i64,
        changes: &LessonPlanChanges,
    ) -> Result<Option<LessonPlan>, AppError>;

    async fn delete_plan(&self, user_id: Uuid, id: i64) -> Result<bool, AppError>;

    async fn list_batches(&self, user_id: Uuid) -> Result<Vec<BatchSummary>, AppError>;

    async fn list_batch(&self, user_id: Uuid, batch_id: Uuid) -> Result<Vec<LessonPlan>, AppError>;

    /// 텔레메트리 기록. 호출하는 쪽은 실패를 무시해야 합니다.
    async fn record_metric(&self, metric: &IaMetric) -> Result<(), AppError>;
}

/// Postgres 연결 풀 기반 저장소
///
/// PgPool은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgStore {
    async fn list_plans(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<(Vec<LessonPlan>, i64), AppError> {
        planeaciones::list_plans(&self.pool, user_id, page).await
    }

    async fn get_plan(&self, user_id: Uuid, id: i64) -> Result<Option<LessonPlan>, AppError> {
        planeaciones::get_plan(&self.pool, user_id, id).await
    }

    async fn create_plan(&self, plan: &NewLessonPlan) -> Result<LessonPlan, AppError> {
        planeaciones::create_plan(&self.pool, plan).await
    }

    async fn update_plan(
        &self,
        user_id: Uuid,
        id: i64,
        changes: &LessonPlanChanges,
    ) -> Result<Option<LessonPlan>, AppError> {
        planeaciones::update_plan(&self.pool, user_id, id, changes).await
    }

    async fn delete_plan(&self, user_id: Uuid, id: i64) -> Result<bool, AppError> {
        planeaciones::delete_plan(&self.pool, user_id, id).await
    }

    async fn list_batches(&self, user_id: Uuid) -> Result<Vec<BatchSummary>, AppError> {
        planeaciones::list_batches(&self.pool, user_id).await
    }

    async fn list_batch(&self, user_id: Uuid, batch_id: Uuid) -> Result<Vec<LessonPlan>, AppError> {
        planeaciones::list_batch(&self.pool, user_id, batch_id).await
    }

    async fn record_metric(&self, metric: &IaMetric) -> Result<(), AppError> {
        metrics::insert_metric(&self.pool, metric).await
    }
}
