//! # Todo API サーバー
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（ローカル PostgreSQL）
//! cargo run -p todo-api
//!
//! # テストモード（インメモリストア）
//! APP_ENV=testing cargo run -p todo-api
//!
//! # 本番環境
//! APP_ENV=production DATABASE_URL=postgresql://... cargo run -p todo-api --release
//! ```

use std::net::SocketAddr;

use anyhow::Context as _;
use todo_api::{
    app_builder::{AppDependencies, build_app},
    config::{AppConfig, StorageConfig},
};
use todo_infra::{db, memory::MemoryStore};
use todo_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // ログレベルはデバッグモードに依存するため、設定読み込み後に初期化する
    let debug = config.as_ref().is_ok_and(|c| c.debug);
    init_tracing(TracingConfig::from_env("todo-api").with_debug(debug));

    let config = config.inspect_err(|e| tracing::error!(error = %e, "設定の読み込みに失敗しました"))?;

    tracing::info!(
        environment = %config.environment,
        debug = config.debug,
        "Todo API を {} モードで起動します（ポート: {}）",
        config.environment,
        config.port
    );

    let deps = match &config.storage {
        StorageConfig::Postgres { url } => {
            let pool = db::create_pool(url)
                .await
                .context("データベース接続に失敗しました")?;
            tracing::info!("データベースに接続しました");

            db::run_migrations(&pool)
                .await
                .context("マイグレーションの適用に失敗しました")?;
            tracing::info!("マイグレーションを適用しました");

            AppDependencies::postgres(pool)
        }
        StorageConfig::InMemory => {
            tracing::info!("インメモリストアを使用します");
            AppDependencies::in_memory(MemoryStore::new())
        }
    };

    let app = build_app(&config, deps);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Todo API が起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
