//! # Todo API 設定
//!
//! 環境変数からサーバー設定を読み込む。起動時に一度だけ構築し、
//! 参照としてルーター構築に渡す。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `APP_ENV` | No | `development` / `testing` / `production`（デフォルト: `development`） |
//! | `HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `5000`） |
//! | `DATABASE_URL` | production のみ | PostgreSQL 接続 URL（前後の空白は除去される） |
//!
//! ## 実行モード
//!
//! | モード | debug | ストア |
//! |--------|-------|--------|
//! | development | on | PostgreSQL（未指定時はローカル開発用 URL） |
//! | testing | off | インメモリ |
//! | production | off | PostgreSQL（`postgresql://` 形式の URL が必須） |

use strum::{Display, EnumString};
use thiserror::Error;

/// development で `DATABASE_URL` が未指定のときの接続先
pub const DEFAULT_DEVELOPMENT_DATABASE_URL: &str = "postgresql://postgres:postgres@db:5432/todo_dev";

/// `PORT` 未指定時のポート番号
pub const DEFAULT_PORT: u16 = 5000;

const POSTGRES_SCHEME: &str = "postgresql://";

/// 実行モード
///
/// 未知の値（`default` を含む）は development として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    /// `APP_ENV` の値から実行モードを決定する
    pub fn resolve(value: Option<&str>) -> Self {
        value
            .map(|v| v.trim().to_ascii_lowercase())
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// 永続化ストアの選択
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// PostgreSQL（接続 URL）
    Postgres { url: String },
    /// プロセス内メモリ（テストモード）
    InMemory,
}

/// 設定の読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL が設定されていません（production では必須です）")]
    MissingDatabaseUrl,

    #[error("DATABASE_URL は postgresql:// で始まる必要があります")]
    InvalidDatabaseUrl,

    #[error("PORT は有効なポート番号である必要があります: {0:?}")]
    InvalidPort(String),
}

/// Todo API サーバーの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 実行モード
    pub environment: Environment,
    /// デバッグモード（development のみ有効）
    pub debug:       bool,
    /// バインドアドレス
    pub host:        String,
    /// ポート番号
    pub port:        u16,
    /// 永続化ストア
    pub storage:     StorageConfig,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// プロセスの環境変数を書き換えずにテストするために分離している。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = Environment::resolve(lookup("APP_ENV").as_deref());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let storage = match environment {
            Environment::Development => StorageConfig::Postgres {
                url: database_url.unwrap_or_else(|| DEFAULT_DEVELOPMENT_DATABASE_URL.to_string()),
            },
            Environment::Testing => StorageConfig::InMemory,
            Environment::Production => {
                let url = database_url.ok_or(ConfigError::MissingDatabaseUrl)?;
                if !url.starts_with(POSTGRES_SCHEME) {
                    return Err(ConfigError::InvalidDatabaseUrl);
                }
                StorageConfig::Postgres { url }
            }
        };

        Ok(Self {
            environment,
            debug: environment == Environment::Development,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            storage,
        })
    }

    /// テストモードの設定（インメモリストア）
    pub fn for_testing() -> Self {
        Self {
            environment: Environment::Testing,
            debug:       false,
            host:        "127.0.0.1".to_string(),
            port:        DEFAULT_PORT,
            storage:     StorageConfig::InMemory,
        }
    }

    pub fn is_testing(&self) -> bool {
        self.environment == Environment::Testing
    }
}
