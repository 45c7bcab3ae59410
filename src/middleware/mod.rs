//! # 미들웨어 모듈
//!
//! - `auth`: Bearer 토큰을 외부 인증 제공자로 검증하는 `AuthUser` 추출기
//! - `cors`: 환경별 CORS 정책과 허용되지 않은 출처 거부

pub mod auth;
pub mod cors;
