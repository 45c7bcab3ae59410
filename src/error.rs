//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 `{ "error": { "code", "message" } }` JSON 응답으로 자동 변환
//! - `panic_response`: 처리되지 않은 패닉을 500 JSON 응답으로 바꾸는 최후의 안전망
//!
//! 상태 코드 규칙:
//! - 400: 요청 검증 실패
//! - 401: 토큰 없음/유효하지 않음 (`middleware::auth::AuthError`)
//! - 403: 허용되지 않은 CORS 출처
//! - 404: 레코드가 없거나 호출자 소유가 아님 (소유 여부는 드러내지 않음)
//! - 500: 저장소·모델 등 외부 의존성 실패 (원인은 서버 로그에만 기록)

use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 허용되지 않은 출처에서 온 요청 (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 외부 서비스(모델 제공자, 인증 제공자) 호출 실패 (HTTP 500)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수 결과에 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }
}

// 요청 본문이나 쿼리 문자열이 파싱되지 않으면 Axum 기본 응답(평문) 대신
// 우리 에러 형식의 400 응답을 돌려줍니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 5xx 에러는 실제 원인을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Forbidden(ref msg) => {
                (StatusCode::FORBIDDEN, "cors_forbidden", msg.clone())
            }
            AppError::Upstream(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    "An upstream service failed".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
        };

        error_body(status, code, &message)
    }
}

/// `{ "error": { "code": ..., "message": ... } }` 형태의 응답을 만듭니다.
pub fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    let body = Json(json!({
        "error": {
            "code": code,
            "message": message
        }
    }));

    (status, body).into_response()
}

/// 어떤 라우트에도 매칭되지 않은 요청에 대한 404 응답
pub async fn route_not_found() -> AppError {
    AppError::NotFound
}

/// `CatchPanicLayer`용 핸들러: 패닉 내용을 로그에 남기고 500 JSON 응답을 반환합니다.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Unhandled panic in request handler: {}", detail);

    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An internal error occurred",
    )
}
