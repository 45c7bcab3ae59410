//! 통합 테스트 공용 도우미
//!
//! 실제 Postgres·Supabase·OpenAI 대신 메모리 구현을 `AppState`에 넣고,
//! `main.rs`와 같은 `build_router`로 라우터를 만들어 `oneshot`으로 요청을 보냅니다.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use educativo_ia::config::{Config, Environment};
use educativo_ia::db::PlanStore;
use educativo_ia::error::AppError;
use educativo_ia::models::*;
use educativo_ia::router::build_router;
use educativo_ia::services::identity::{Identity, IdentityError, IdentityProvider};
use educativo_ia::services::llm::{Completion, CompletionRequest, ModelError, TextGenerator};
use educativo_ia::state::AppState;

pub const OWNER_TOKEN: &str = "token-maestra";
pub const OTHER_TOKEN: &str = "token-otro";
/// 인증 제공자 장애를 흉내 내는 토큰
pub const OUTAGE_TOKEN: &str = "token-caido";

// ---------------------------------------------------------------------------
// 메모리 저장소
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreInner {
    rows: Vec<LessonPlan>,
    next_id: i64,
    metrics: Vec<IaMetric>,
}

/// `PlanStore`의 메모리 구현
///
/// `failing_metrics()`는 텔레메트리 기록이, `failing_creates()`는 행 저장이 항상 실패합니다.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
    fail_metrics: bool,
    fail_creates: bool,
}

impl MemoryStore {
    pub fn failing_creates() -> Self {
        Self {
            fail_creates: true,
            ..Self::default()
        }
    }

    pub fn failing_metrics() -> Self {
        Self {
            fail_metrics: true,
            ..Self::default()
        }
    }

    pub fn metrics(&self) -> Vec<IaMetric> {
        self.inner.lock().unwrap().metrics.clone()
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn list_plans(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<(Vec<LessonPlan>, i64), AppError> {
        let inner = self.inner.lock().unwrap();
        let mut own: Vec<LessonPlan> = inner
            .rows
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| (b.fecha_creacion, b.id).cmp(&(a.fecha_creacion, a.id)));

        let total = own.len() as i64;
        let rows = own
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Ok((rows, total))
    }

    async fn get_plan(&self, user_id: Uuid, id: i64) -> Result<Option<LessonPlan>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn create_plan(&self, plan: &NewLessonPlan) -> Result<LessonPlan, AppError> {
        if self.fail_creates {
            return Err(AppError::Internal("planeaciones table unavailable".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let row = LessonPlan {
            id: inner.next_id,
            user_id: plan.user_id,
            batch_id: plan.batch_id,
            materia: plan.materia.clone(),
            nivel: plan.nivel.clone(),
            unidad: plan.unidad.clone(),
            tema: plan.tema.clone(),
            subtema: plan.subtema.clone(),
            duracion: plan.duracion,
            sesiones: plan.sesiones,
            tabla_ia: plan.tabla_ia.clone(),
            fecha_creacion: Utc::now(),
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update_plan(
        &self,
        user_id: Uuid,
        id: i64,
        changes: &LessonPlanChanges,
    ) -> Result<Option<LessonPlan>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(row) = inner
            .rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(v) = &changes.materia {
            row.materia = v.clone();
        }
        if let Some(v) = &changes.nivel {
            row.nivel = v.clone();
        }
        if let Some(v) = &changes.unidad {
            row.unidad = Some(v.clone());
        }
        if let Some(v) = &changes.tema {
            row.tema = v.clone();
        }
        if let Some(v) = &changes.subtema {
            row.subtema = Some(v.clone());
        }
        if let Some(v) = changes.duracion {
            row.duracion = v;
        }
        if let Some(v) = changes.sesiones {
            row.sesiones = Some(v);
        }
        if let Some(v) = &changes.tabla_ia {
            row.tabla_ia = v.clone();
        }
        Ok(Some(row.clone()))
    }

    async fn delete_plan(&self, user_id: Uuid, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(inner.rows.len() != before)
    }

    async fn list_batches(&self, user_id: Uuid) -> Result<Vec<BatchSummary>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut batches: Vec<BatchSummary> = Vec::new();
        for row in inner.rows.iter().filter(|p| p.user_id == user_id) {
            let Some(batch_id) = row.batch_id else {
                continue;
            };
            match batches.iter_mut().find(|b| b.batch_id == batch_id) {
                Some(summary) => {
                    summary.total += 1;
                    summary.fecha_creacion = summary.fecha_creacion.min(row.fecha_creacion);
                }
                None => batches.push(BatchSummary {
                    batch_id,
                    total: 1,
                    materia: row.materia.clone(),
                    nivel: row.nivel.clone(),
                    unidad: row.unidad.clone(),
                    fecha_creacion: row.fecha_creacion,
                }),
            }
        }
        batches.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
        Ok(batches)
    }

    async fn list_batch(&self, user_id: Uuid, batch_id: Uuid) -> Result<Vec<LessonPlan>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|p| p.user_id == user_id && p.batch_id == Some(batch_id))
            .cloned()
            .collect())
    }

    async fn record_metric(&self, metric: &IaMetric) -> Result<(), AppError> {
        if self.fail_metrics {
            return Err(AppError::Internal("ia_metrics table unavailable".to_string()));
        }
        self.inner.lock().unwrap().metrics.push(metric.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 인증 제공자 / 생성 모델 대역
// ---------------------------------------------------------------------------

/// 고정된 토큰 → 사용자 매핑
pub struct FakeIdentity {
    users: HashMap<String, Uuid>,
}

impl FakeIdentity {
    pub fn new(users: &[(&str, Uuid)]) -> Self {
        Self {
            users: users.iter().map(|(t, id)| (t.to_string(), *id)).collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        if token == OUTAGE_TOKEN {
            return Err(IdentityError::Unavailable("connection refused".to_string()));
        }
        self.users
            .get(token)
            .map(|user_id| Identity { user_id: *user_id })
            .ok_or(IdentityError::Rejected)
    }
}

/// 항상 같은 텍스트를 돌려주거나 항상 실패하는 모델
pub struct ScriptedModel {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);

        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                prompt_tokens: 120,
                completion_tokens: 80,
                total_tokens: 200,
            }),
            None => Err(ModelError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// 앱 구성
// ---------------------------------------------------------------------------

pub fn test_config(env: Environment) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        env,
        allowed_origins: vec!["https://planea.mx".to_string()],
        database_url: "postgres://unused".to_string(),
        supabase_url: "http://supabase.invalid".to_string(),
        supabase_key: "anon".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_model: "gpt-4o-mini".to_string(),
        openai_base_url: "http://openai.invalid/v1".to_string(),
    }
}

/// 테스트 하나가 다루는 앱과 그 협력자들
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub model: Arc<ScriptedModel>,
    pub owner: Uuid,
    pub other: Uuid,
}

impl TestApp {
    pub fn new(model: ScriptedModel) -> Self {
        Self::with(Environment::Development, MemoryStore::default(), model)
    }

    pub fn with(env: Environment, store: MemoryStore, model: ScriptedModel) -> Self {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let store = Arc::new(store);
        let model = Arc::new(model);

        let state = AppState {
            config: Arc::new(test_config(env)),
            store: store.clone(),
            identity: Arc::new(FakeIdentity::new(&[
                (OWNER_TOKEN, owner),
                (OTHER_TOKEN, other),
            ])),
            model: model.clone(),
        };

        Self {
            router: build_router(state),
            store,
            model,
            owner,
            other,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

// ---------------------------------------------------------------------------
// 요청 / 응답 도우미
// ---------------------------------------------------------------------------

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// 시간 합계 50분, 평가 비중 합계 10인 올바른 모델 표
pub fn model_table_json() -> Value {
    serde_json::json!([
        {"momento": "Conocimientos previos", "actividades": "Preguntas sobre repartos", "tiempo_min": 10,
         "producto": "Lluvia de ideas", "instrumento": "Lista de cotejo",
         "evaluacion_formativa": "Reconoce partes de un entero", "evaluacion_sumativa": 2},
        {"momento": "Desarrollo", "actividades": "Fracciones con material concreto", "tiempo_min": 30,
         "producto": "Hoja de ejercicios", "instrumento": "Rúbrica",
         "evaluacion_formativa": "Representa fracciones", "evaluacion_sumativa": 6},
        {"momento": "Cierre", "actividades": "Puesta en común", "tiempo_min": 10,
         "producto": "Conclusión", "instrumento": "Escala de valoración",
         "evaluacion_formativa": "Explica lo aprendido", "evaluacion_sumativa": 2}
    ])
}
