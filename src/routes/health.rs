//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /`       → 평문 안내 문구
//! - `GET /health` → `{ "ok": true, "env": "production" }`
//!
//! 로드밸런서나 호스팅 플랫폼의 상태 확인용입니다. 인증이 필요 없습니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /` — 서버가 떠 있는지 사람이 확인하는 용도
pub async fn root() -> &'static str {
    "Servidor educativo-ia funcionando 🚀"
}

/// `GET /health` — 실행 환경을 함께 반환합니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "env": state.config.env.as_str()
    }))
}
