//! # Todo ハンドラ
//!
//! Todo の CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/todos` - 一覧（ID 昇順、件数付き）
//! - `POST /api/todos` - 作成
//! - `GET /api/todos/{id}` - 取得
//! - `PUT /api/todos/{id}` - 部分更新
//! - `DELETE /api/todos/{id}` - 削除

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize};
use todo_domain::todo::{Todo, TodoId};
use todo_shared::{ApiResponse, ListResponse, MessageResponse};

use crate::{
    error::ApiError,
    extract::{ApiJson, ApiPath},
    usecase::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput},
};

pub const TODO_CREATED_MESSAGE: &str = "Todo created successfully";
pub const TODO_UPDATED_MESSAGE: &str = "Todo updated successfully";
pub const TODO_DELETED_MESSAGE: &str = "Todo deleted successfully";

/// Todo API の共有状態
pub struct TodoState {
    pub usecase: TodoUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// Todo 作成リクエスト
///
/// ボディが `null` のときは空オブジェクトとして扱い、タイトル検証に回す。
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title:       Option<String>,
    pub description: Option<String>,
}

/// Todo 更新リクエスト
///
/// キーの有無と null を区別する: 未指定は `None`、null は `Some(None)`。
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title:       Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub completed:   Option<Option<bool>>,
}

/// キーが存在すれば値が null でも `Some` にする
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTodoRequest> for UpdateTodoInput {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title:       req.title.map(Option::unwrap_or_default),
            description: req.description.map(Option::unwrap_or_default),
            completed:   req.completed,
        }
    }
}

/// Todo DTO
///
/// タイムスタンプは UTC・マイクロ秒精度の RFC 3339 文字列。
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoDto {
    pub id:          i64,
    pub title:       String,
    pub description: String,
    pub completed:   bool,
    pub created_at:  String,
    pub updated_at:  String,
}

impl From<&Todo> for TodoDto {
    fn from(todo: &Todo) -> Self {
        Self {
            id:          todo.id().as_i64(),
            title:       todo.title().as_str().to_string(),
            description: todo.description().to_string(),
            completed:   todo.completed(),
            created_at:  todo.created_at().to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at:  todo.updated_at().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

// --- ハンドラ ---

/// GET /api/todos
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = state.usecase.list_todos().await?;

    let items: Vec<TodoDto> = todos.iter().map(TodoDto::from).collect();
    Ok((StatusCode::OK, Json(ListResponse::new(items))))
}

/// POST /api/todos
///
/// ## レスポンス
///
/// - `201 Created`: 作成された Todo
/// - `400 Bad Request`: タイトル未指定・空白のみ、不正な JSON
/// - `500 Internal Server Error`: 書き込み失敗（ロールバック済み）
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    ApiJson(req): ApiJson<Option<CreateTodoRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = req.unwrap_or_default();
    let input = CreateTodoInput {
        title:       req.title,
        description: req.description,
    };

    let todo = state.usecase.create_todo(input).await?;

    let response = ApiResponse::with_message(TodoDto::from(&todo), TODO_CREATED_MESSAGE);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/todos/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_todo(
    State(state): State<Arc<TodoState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state.usecase.get_todo(TodoId::new(id)).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(TodoDto::from(&todo)))))
}

/// PUT /api/todos/{id}
///
/// 指定されたフィールドのみ更新する。
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の Todo
/// - `400 Bad Request`: タイトルが空白のみ、`completed` が null、不正な JSON
/// - `404 Not Found`: Todo が見つからない
/// - `500 Internal Server Error`: 書き込み失敗（ロールバック済み）
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .usecase
        .update_todo(TodoId::new(id), req.into())
        .await?;

    let response = ApiResponse::with_message(TodoDto::from(&todo), TODO_UPDATED_MESSAGE);
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/todos/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.usecase.delete_todo(TodoId::new(id)).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new(TODO_DELETED_MESSAGE))))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};
    use todo_infra::memory::MemoryStore;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app_builder::{AppDependencies, build_app},
        config::AppConfig,
    };

    // テスト用ルーター

    fn create_test_app(store: &MemoryStore) -> Router {
        build_app(
            &AppConfig::for_testing(),
            AppDependencies::in_memory(store.clone()),
        )
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(app: &Router, body: Value) -> TodoDto {
        let (status, body) = send(app, json_request(Method::POST, "/api/todos", body)).await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_value(body["data"].clone()).unwrap()
    }

    // ===== POST /api/todos =====

    #[tokio::test]
    async fn test_post_全フィールド指定で201が返る() {
        // Given
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        // When
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/todos",
                json!({ "title": "Test Todo", "description": "Test Description" }),
            ),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Todo created successfully");
        assert_eq!(body["data"]["title"], "Test Todo");
        assert_eq!(body["data"]["description"], "Test Description");
        assert_eq!(body["data"]["completed"], false);
        assert!(body["data"]["id"].is_i64());
        assert_eq!(body["data"]["created_at"], body["data"]["updated_at"]);
    }

    #[tokio::test]
    async fn test_post_タイトルのみで説明は空文字列になる() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        let todo = create(&app, json!({ "title": "  Title Only  " })).await;

        assert_eq!(todo.title, "Title Only");
        assert_eq!(todo.description, "");
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "description": "No title" }))]
    #[case(json!({ "title": null }))]
    #[case(json!(null))]
    #[case(json!({ "title": "" }))]
    #[case(json!({ "title": "   " }))]
    #[tokio::test]
    async fn test_post_タイトルがないとき400が返り保存されない(#[case] payload: Value) {
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        let (status, body) = send(&app, json_request(Method::POST, "/api/todos", payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "Title is required" }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_post_不正なjsonで400が返る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/todos")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "Invalid JSON payload" }));
    }

    #[tokio::test]
    async fn test_post_コミット失敗で500が返り行が残らない() {
        // Given
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        store.fail_commits(true);

        // When
        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/todos", json!({ "title": "Test Todo" })),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(store.is_empty().await);
    }

    // ===== GET /api/todos =====

    #[tokio::test]
    async fn test_get_一覧が空のときcount0が返る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        let (status, body) = send(&app, empty_request(Method::GET, "/api/todos")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "count": 0, "data": [] }));
    }

    #[tokio::test]
    async fn test_get_一覧はid昇順で全件を返す() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let mut created_ids = Vec::new();
        for title in ["first", "second", "third"] {
            created_ids.push(create(&app, json!({ "title": title })).await.id);
        }

        let (status, body) = send(&app, empty_request(Method::GET, "/api/todos")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        let listed: Vec<TodoDto> = serde_json::from_value(body["data"].clone()).unwrap();
        let listed_ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
        assert_eq!(listed_ids, created_ids);
    }

    #[tokio::test]
    async fn test_get_読み取り失敗は詳細を伏せた500になる() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        store.set_unavailable(true);

        let (status, body) = send(&app, empty_request(Method::GET, "/api/todos")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Internal server error" }));
    }

    // ===== GET /api/todos/{id} =====

    #[tokio::test]
    async fn test_get_存在するidで200が返る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "Find me" })).await;

        let (status, body) = send(
            &app,
            empty_request(Method::GET, &format!("/api/todos/{}", created.id)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let found: TodoDto = serde_json::from_value(body["data"].clone()).unwrap();
        assert_eq!(found, created);
    }

    #[rstest]
    #[case(Method::GET)]
    #[case(Method::DELETE)]
    #[tokio::test]
    async fn test_存在しないidで404が返る(#[case] method: Method) {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        create(&app, json!({ "title": "Someone else" })).await;

        let (status, body) = send(&app, empty_request(method, "/api/todos/999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Todo with id 999 not found" })
        );
    }

    #[tokio::test]
    async fn test_get_数値でないidは未定義ルートとして404が返る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        let (status, body) = send(&app, empty_request(Method::GET, "/api/todos/abc")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "Resource not found" }));
    }

    // ===== PUT /api/todos/{id} =====

    #[tokio::test]
    async fn test_put_指定したフィールドのみ更新される() {
        // Given
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(
            &app,
            json!({ "title": "Original", "description": "Keep me" }),
        )
        .await;

        // When
        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/todos/{}", created.id),
                json!({ "completed": true }),
            ),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo updated successfully");
        let updated: TodoDto = serde_json::from_value(body["data"].clone()).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.description, "Keep me");
        assert!(updated.completed);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[rstest]
    #[case(json!({ "title": "" }), "Title is required")]
    #[case(json!({ "title": "   " }), "Title is required")]
    #[case(json!({ "title": null }), "Title is required")]
    #[case(json!({ "completed": null }), "Completed must be a boolean")]
    #[tokio::test]
    async fn test_put_不正な値で400が返り変更されない(
        #[case] payload: Value,
        #[case] expected: &str,
    ) {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "Stable" })).await;
        let uri = format!("/api/todos/{}", created.id);

        let (status, body) = send(&app, json_request(Method::PUT, &uri, payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": expected }));
        let (_, body) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(body["data"]["title"], "Stable");
    }

    #[tokio::test]
    async fn test_put_descriptionにnullを指定すると空文字列になる() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "t", "description": "d" })).await;

        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/todos/{}", created.id),
                json!({ "description": null }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["description"], "");
    }

    #[tokio::test]
    async fn test_put_存在しないidで404が返る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);

        let (status, body) = send(
            &app,
            json_request(Method::PUT, "/api/todos/999", json!({ "title": "x" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Todo with id 999 not found");
    }

    #[tokio::test]
    async fn test_put_コミット失敗で500が返り変更が残らない() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "Before" })).await;
        let uri = format!("/api/todos/{}", created.id);
        store.fail_commits(true);

        let (status, body) =
            send(&app, json_request(Method::PUT, &uri, json!({ "title": "After" }))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body.get("error").is_some());

        store.fail_commits(false);
        let (_, body) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(body["data"]["title"], "Before");
    }

    // ===== DELETE /api/todos/{id} =====

    #[tokio::test]
    async fn test_delete_削除後は404になる() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "Delete me" })).await;
        let uri = format!("/api/todos/{}", created.id);

        let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "message": "Todo deleted successfully" })
        );
        let (status, _) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_コミット失敗で500が返り行が残る() {
        let store = MemoryStore::new();
        let app = create_test_app(&store);
        let created = create(&app, json!({ "title": "Survivor" })).await;
        store.fail_commits(true);

        let (status, body) = send(
            &app,
            empty_request(Method::DELETE, &format!("/api/todos/{}", created.id)),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(store.len().await, 1);
    }

    // ===== DTO =====

    #[test]
    fn test_dtoのタイムスタンプはマイクロ秒精度のrfc3339() {
        use chrono::DateTime;
        use todo_domain::todo::{NewTodo, TodoTitle};

        let now = DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap();
        let todo = NewTodo::new(TodoTitle::new("t").unwrap(), None, now).into_todo(TodoId::new(1));

        let dto = TodoDto::from(&todo);

        assert_eq!(dto.created_at, "2023-11-14T22:13:20.123456Z");
        assert_eq!(dto.updated_at, dto.created_at);
    }
}
