//! # educativo-ia
//!
//! 교사용 수업 계획(planeación) 서비스의 라이브러리 루트입니다.
//! 바이너리(`main.rs`)와 통합 테스트(`tests/`)가 같은 모듈을 공유합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
