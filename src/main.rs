//! # educativo-ia 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화 (프로덕션은 JSON 한 줄 로그)
//! 3. Postgres 연결 풀 생성과 마이그레이션
//! 4. 외부 협력자(인증 제공자, 텍스트 생성 모델) 클라이언트 생성
//! 5. 라우터 구성 후 HTTP 서버 시작 (Ctrl+C로 정상 종료)

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use educativo_ia::{
    config::Config,
    db::PgStore,
    router::build_router,
    services::{identity::SupabaseAuth, llm::OpenAiClient},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Missing required environment variable")?;
    init_tracing(config.env.is_production());

    tracing::info!(
        env = %config.env,
        "Starting educativo-ia server on {}:{}",
        config.host,
        config.port
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let identity = SupabaseAuth::new(config.supabase_url.clone(), config.supabase_key.clone())?;
    let model = OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    )?;
    tracing::info!(model = %config.openai_model, "Text generation client ready");

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(PgStore::new(pool)),
        identity: Arc::new(identity),
        model: Arc::new(model),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// RUST_LOG가 없으면 이 크레이트와 HTTP 계층을 debug 레벨로 기록합니다.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "educativo_ia=debug,tower_http=debug,axum=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Ctrl+C 또는 SIGTERM(호스팅 플랫폼의 종료 신호)을 기다립니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
