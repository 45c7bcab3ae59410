//! # CORS 정책
//!
//! - 개발 환경: 모든 출처 허용
//! - 프로덕션: `ALLOWED_ORIGINS` 목록 + localhost/루프백 + `https://*.github.io`
//!
//! 허용되지 않은 출처에서 온 요청은 `reject_disallowed_origin` 미들웨어가
//! 403 `cors_forbidden` 응답으로 막습니다. `Origin` 헤더가 없는 요청(서버 간 호출, curl)은 통과합니다.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, ORIGIN},
        request::Parts,
        HeaderName, HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::error::AppError;

/// 공개 페이지(GitHub Pages) 도메인 접미사
const PUBLIC_PAGES_SUFFIX: &str = ".github.io";

/// 출처 허용 여부를 판단하는 불변 정책
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_any: bool,
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allow_any: !config.env.is_production(),
            allowed: config.allowed_origins.clone(),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.allow_any {
            return true;
        }
        let origin = origin.trim_end_matches('/');
        self.allowed.iter().any(|o| o == origin) || is_loopback(origin) || is_public_pages(origin)
    }
}

// http(s)://localhost[:port], http(s)://127.0.0.1[:port], http(s)://[::1][:port]
fn is_loopback(origin: &str) -> bool {
    let Some(authority) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    ["localhost", "127.0.0.1", "[::1]"].iter().any(|host| {
        authority
            .strip_prefix(host)
            .map(|rest| rest.is_empty() || is_port_suffix(rest))
            .unwrap_or(false)
    })
}

fn is_port_suffix(rest: &str) -> bool {
    rest.strip_prefix(':')
        .map(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

// https://<usuario>.github.io
fn is_public_pages(origin: &str) -> bool {
    let Some(host) = origin.strip_prefix("https://") else {
        return false;
    };
    let Some(name) = host.strip_suffix(PUBLIC_PAGES_SUFFIX) else {
        return false;
    };
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// 정책에 맞는 `CorsLayer`를 만듭니다.
pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    let exposed = [CONTENT_DISPOSITION, HeaderName::from_static("x-total-count")];

    if policy.allow_any {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(exposed);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| policy.is_allowed(o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers(exposed)
}

/// 허용되지 않은 `Origin`에서 온 요청을 403으로 거부하는 미들웨어
pub async fn reject_disallowed_origin(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| policy.is_allowed(o))
            .unwrap_or(false);
        if !allowed {
            tracing::warn!(origin = ?origin, "Rejected request from disallowed origin");
            return AppError::Forbidden("Origin not allowed by CORS policy".to_string())
                .into_response();
        }
    }

    next.run(request).await
}
