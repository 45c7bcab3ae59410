//! # 서비스 계층
//!
//! 라우트 핸들러가 사용하는 도메인 로직과 외부 API 클라이언트입니다.
//!
//! - `prompt`: 교육 수준별 프롬프트 생성
//! - `llm`: 텍스트 생성 모델 클라이언트 (OpenAI 호환)
//! - `generation`: 생성 → 파싱 → 저장 → 텔레메트리 파이프라인
//! - `identity`: 외부 인증 제공자에게 토큰 검증 위임
//! - `export`: 수업 계획 엑셀 내보내기

pub mod export;
pub mod generation;
pub mod identity;
pub mod llm;
pub mod prompt;
