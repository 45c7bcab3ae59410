//! # API 라우터 구성
//!
//! `main.rs`와 통합 테스트가 같은 라우터와 미들웨어 스택을 쓰도록 한곳에 모았습니다.
//!
//! 미들웨어는 아래에서 위로 감쌉니다. 요청은 바깥쪽부터 통과합니다:
//! TraceLayer → CatchPanicLayer → 출처 거부 → CorsLayer → 핸들러

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    error::{panic_response, route_not_found},
    middleware::cors::{cors_layer, reject_disallowed_origin, OriginPolicy},
    routes::*,
    state::AppState,
};

/// 모든 라우트와 미들웨어가 적용된 애플리케이션 라우터를 만듭니다.
pub fn build_router(state: AppState) -> Router {
    let policy = Arc::new(OriginPolicy::from_config(&state.config));

    // 고정 경로(generate, batches)는 `{id}`보다 우선 매칭됩니다.
    let api_routes = Router::new()
        .route(
            "/planeaciones",
            get(list_planeaciones).post(create_planeacion),
        )
        .route("/planeaciones/generate", post(generate_planeaciones))
        .route("/planeaciones/batches", get(list_batches))
        .route("/planeaciones/batch/{batch_id}", get(get_batch))
        .route(
            "/planeaciones/{id}",
            get(get_planeacion)
                .put(update_planeacion)
                .delete(delete_planeacion),
        )
        .route(
            "/planeaciones/{id}/export/excel",
            get(export_planeacion_excel),
        );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors_layer(policy.clone()))
        .layer(from_fn_with_state(policy, reject_disallowed_origin))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}
