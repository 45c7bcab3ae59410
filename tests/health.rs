//! 헬스체크, 알 수 없는 경로, CORS 정책 통합 테스트

mod common;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use axum::http::{Method, Request, StatusCode};
use axum::body::Body;
use common::{body_bytes, body_json, request, MemoryStore, ScriptedModel, TestApp, OWNER_TOKEN};
use educativo_ia::config::Environment;

fn production_app() -> TestApp {
    TestApp::with(
        Environment::Production,
        MemoryStore::default(),
        ScriptedModel::failing(),
    )
}

fn with_origin(method: Method, uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// 헬스체크
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_returns_banner() {
    let app = TestApp::new(ScriptedModel::failing());
    let response = app.send(request(Method::GET, "/", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("educativo-ia"));
}

#[tokio::test]
async fn health_reports_environment() {
    let app = TestApp::new(ScriptedModel::failing());
    let response = app.send(request(Method::GET, "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["env"], "development");

    let response = production_app()
        .send(request(Method::GET, "/health", None, None))
        .await;
    assert_eq!(body_json(response).await["env"], "production");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = TestApp::new(ScriptedModel::failing());
    let response = app
        .send(request(Method::GET, "/no-existe", Some(OWNER_TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn development_allows_any_origin() {
    let app = TestApp::new(ScriptedModel::failing());
    let response = app
        .send(with_origin(Method::GET, "/health", "https://cualquier.example"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn production_rejects_unlisted_origin() {
    let response = production_app()
        .send(with_origin(Method::GET, "/health", "https://evil.example"))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], "cors_forbidden");
}

#[tokio::test]
async fn production_allows_listed_loopback_and_pages_origins() {
    for origin in [
        "https://planea.mx",
        "http://localhost:5173",
        "http://127.0.0.1:8080",
        "https://maestra-ana.github.io",
    ] {
        let response = production_app()
            .send(with_origin(Method::GET, "/health", origin))
            .await;

        assert_eq!(response.status(), StatusCode::OK, "origin {origin}");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], origin);
    }
}

#[tokio::test]
async fn production_answers_preflight_for_allowed_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/planeaciones")
        .header(ORIGIN, "https://planea.mx")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = production_app().send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://planea.mx"
    );
}

#[tokio::test]
async fn requests_without_origin_are_not_blocked() {
    let response = production_app()
        .send(request(Method::GET, "/health", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
