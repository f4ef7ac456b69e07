//! # Todo API 統合テスト
//!
//! テストモード（インメモリストア）のアプリケーション全体をルーター経由で検証する。
//!
//! - 作成 → 取得 → 更新 → 削除 → 取得（404）の一連の流れ
//! - 一覧件数と ID の一意性
//! - 書き込み失敗時に部分的な行が残らないこと
//! - ストア障害時のヘルスチェック

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use todo_api::{
    app_builder::{AppDependencies, build_app},
    config::AppConfig,
};
use todo_infra::memory::MemoryStore;
use tower::ServiceExt;

struct TestApp {
    store:  MemoryStore,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let store = MemoryStore::new();
        let router = build_app(
            &AppConfig::for_testing(),
            AppDependencies::in_memory(store.clone()),
        );
        Self { store, router }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(&self, body: Value) -> Value {
        let (status, body) = self.request(Method::POST, "/api/todos", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_todoのライフサイクル全体() {
    let app = TestApp::new();

    // 作成
    let (status, body) = app
        .request(
            Method::POST,
            "/api/todos",
            Some(json!({
                "title": "Integration Test Todo",
                "description": "Testing full lifecycle"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/todos/{id}");

    // 取得
    let (status, body) = app.request(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Integration Test Todo");
    assert_eq!(body["data"]["description"], "Testing full lifecycle");

    // 更新
    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "title": "Updated Integration Test", "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Updated Integration Test");
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["description"], "Testing full lifecycle");

    // 削除
    let (status, body) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // 削除後の取得
    let (status, body) = app.request(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], format!("Todo with id {id} not found"));
}

#[tokio::test]
async fn test_一覧の件数は作成数と一致しidは一意() {
    let app = TestApp::new();
    for i in 0..5 {
        app.create(json!({ "title": format!("Todo {i}") })).await;
    }

    let (status, body) = app.request(Method::GET, "/api/todos", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    let mut unique = ids.clone();
    unique.dedup();
    assert_eq!(ids.len(), 5);
    assert_eq!(unique, ids);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_削除したidは再利用されない() {
    let app = TestApp::new();
    let first = app.create(json!({ "title": "first" })).await;
    let first_id = first["id"].as_i64().unwrap();
    app.request(Method::DELETE, &format!("/api/todos/{first_id}"), None)
        .await;

    let second = app.create(json!({ "title": "second" })).await;

    assert!(second["id"].as_i64().unwrap() > first_id);
}

#[tokio::test]
async fn test_存在しないidは作成の前後を問わず404() {
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/api/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.create(json!({ "title": "exists" })).await;
    let (status, body) = app.request(Method::GET, "/api/todos/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Todo with id 999 not found");
}

#[tokio::test]
async fn test_タイトルが空白のみの作成は行を残さない() {
    let app = TestApp::new();

    let (status, body) = app
        .request(Method::POST, "/api/todos", Some(json!({ "title": "   " })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
    let (_, body) = app.request(Method::GET, "/api/todos", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_コミット失敗時は部分的な行が残らない() {
    let app = TestApp::new();
    let kept = app.create(json!({ "title": "kept" })).await;
    app.store.fail_commits(true);

    let (create_status, _) = app
        .request(Method::POST, "/api/todos", Some(json!({ "title": "lost" })))
        .await;
    let (update_status, _) = app
        .request(
            Method::PUT,
            &format!("/api/todos/{}", kept["id"]),
            Some(json!({ "title": "changed" })),
        )
        .await;

    assert_eq!(create_status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(update_status, StatusCode::INTERNAL_SERVER_ERROR);

    app.store.fail_commits(false);
    let (_, body) = app.request(Method::GET, "/api/todos", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0], kept);
}

#[tokio::test]
async fn test_ストア障害時はヘルスチェックが503() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "database": "connected" }));

    app.store.set_unavailable(true);
    let (status, body) = app.request(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_数値でないidは未定義ルートとして404() {
    let app = TestApp::new();

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = app.request(method, "/api/todos/not-a-number", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "Resource not found" }));
    }
}
