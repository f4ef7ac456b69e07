//! # アプリケーション構築
//!
//! 依存（リポジトリ・トランザクション管理・疎通確認・時計）から State を組み立て、
//! ルーターとミドルウェアを構築する。`main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{fmt, sync::Arc};

use axum::{Router, routing::get};
use sqlx::PgPool;
use todo_domain::clock::{Clock, SystemClock};
use todo_infra::{
    db::{ConnectionProbe, PgConnectionProbe, PgTransactionManager, TransactionManager},
    memory::{InMemoryTodoRepository, MemoryStore},
    repository::{PostgresTodoRepository, TodoRepository},
};
use todo_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::AppConfig,
    error::{handle_panic, method_not_allowed, route_not_found},
    handler::{
        HealthState,
        TodoState,
        create_todo,
        delete_todo,
        get_todo,
        health_check,
        list_todos,
        service_info,
        update_todo,
    },
    usecase::TodoUseCaseImpl,
};

const ROOT_PATH: &str = "/";
const HEALTH_PATH: &str = "/api/health";
const TODOS_PATH: &str = "/api/todos";
const TODO_PATH: &str = "/api/todos/{id}";

/// 公開エンドポイント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: &'static str,
    pub path:   &'static str,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

const fn endpoint(method: &'static str, path: &'static str) -> Endpoint {
    Endpoint { method, path }
}

/// ルート表
///
/// `build_router` が登録するルートと一致させること（テストで検証している）。
pub const ENDPOINTS: &[Endpoint] = &[
    endpoint("GET", ROOT_PATH),
    endpoint("GET", HEALTH_PATH),
    endpoint("GET", TODOS_PATH),
    endpoint("POST", TODOS_PATH),
    endpoint("GET", TODO_PATH),
    endpoint("PUT", TODO_PATH),
    endpoint("DELETE", TODO_PATH),
];

/// ルーター構築に必要な依存
pub struct AppDependencies {
    pub todo_repository: Arc<dyn TodoRepository>,
    pub tx_manager:      Arc<dyn TransactionManager>,
    pub probe:           Arc<dyn ConnectionProbe>,
    pub clock:           Arc<dyn Clock>,
}

impl AppDependencies {
    /// PostgreSQL をストアとする依存を構築する
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            todo_repository: Arc::new(PostgresTodoRepository::new(pool.clone())),
            tx_manager:      Arc::new(PgTransactionManager::new(pool.clone())),
            probe:           Arc::new(PgConnectionProbe::new(pool)),
            clock:           Arc::new(SystemClock),
        }
    }

    /// インメモリストアをストアとする依存を構築する（テストモード）
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            todo_repository: Arc::new(InMemoryTodoRepository::new(store.clone())),
            tx_manager:      Arc::new(store.clone()),
            probe:           Arc::new(store),
            clock:           Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// ルートとフォールバックを登録したルーターを構築する（ミドルウェアなし）
pub fn build_router(deps: AppDependencies) -> Router {
    let todo_state = Arc::new(TodoState {
        usecase: TodoUseCaseImpl::new(deps.todo_repository, deps.tx_manager, deps.clock),
    });
    let health_state = Arc::new(HealthState { probe: deps.probe });

    Router::new()
        .route(ROOT_PATH, get(service_info))
        .merge(
            Router::new()
                .route(HEALTH_PATH, get(health_check))
                .with_state(health_state),
        )
        .merge(
            Router::new()
                .route(TODOS_PATH, get(list_todos).post(create_todo))
                .route(
                    TODO_PATH,
                    get(get_todo).put(update_todo).delete(delete_todo),
                )
                .with_state(todo_state),
        )
        .fallback(route_not_found)
        // 登録済みの全ルートに適用されるため、ルート追加より後に呼ぶ
        .method_not_allowed_fallback(method_not_allowed)
}

/// 共通ミドルウェアを適用する
///
/// レイヤー順序（下に書いたものが外側）:
/// 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
/// 2. TraceLayer: request_id を含むスパンで全ログを囲む
/// 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
/// 4. CatchPanicLayer: ハンドラの panic を 500 エンベロープに変換
pub fn apply_layers(router: Router, config: &AppConfig) -> Router {
    let response_level = if config.debug {
        Level::INFO
    } else {
        Level::DEBUG
    };

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(DefaultOnResponse::new().level(response_level)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// ルーター構築とミドルウェア適用をまとめて行う
pub fn build_app(config: &AppConfig, deps: AppDependencies) -> Router {
    apply_layers(build_router(deps), config)
}
