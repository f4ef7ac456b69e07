//! # Todo API エラー定義
//!
//! API 固有のエラーと、HTTP レスポンス（エラーエンベロープ）への変換を定義する。
//!
//! | バリアント | ステータス | `error` フィールド |
//! |-----------|-----------|-------------------|
//! | `Validation` | 400 | 検証メッセージ |
//! | `InvalidJson` | 400 | `Invalid JSON payload` |
//! | `TodoNotFound` | 404 | `Todo with id {id} not found` |
//! | `RouteNotFound` | 404 | `Resource not found` |
//! | `MethodNotAllowed` | 405 | `Method not allowed` |
//! | `Persistence` | 500 | ストアのエラーメッセージ |
//! | `Internal` | 500 | `Internal server error`（詳細はログのみ） |

use std::any::Any;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::{DomainError, todo::TodoId};
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// Todo API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 入力値の検証失敗
    #[error("{0}")]
    Validation(String),

    /// リクエストボディが JSON として解釈できない
    #[error("Invalid JSON payload")]
    InvalidJson(#[from] JsonRejection),

    /// 指定 ID の Todo が存在しない
    #[error("Todo with id {0} not found")]
    TodoNotFound(TodoId),

    /// ルートに一致しない
    #[error("Resource not found")]
    RouteNotFound,

    /// パスは一致するがメソッドが許可されていない
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// 書き込み失敗（ロールバック済み）。メッセージはクライアントに返す
    #[error("{0}")]
    Persistence(InfraError),

    /// 想定外の失敗。詳細はログにのみ出力する
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// 読み取り系のストアエラーを内部エラーとして扱う
    pub fn internal(err: InfraError) -> Self {
        Self::Internal(err.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::TodoNotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
        }
    }
}

/// 数値として解釈できないパスパラメータは未定義ルートと同じ扱い
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(rejection = %rejection, "パスパラメータを解釈できません");
        Self::RouteNotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::InvalidJson(rejection) => {
                tracing::debug!(rejection = %rejection.body_text(), "JSON ペイロードを解釈できません");
            }
            ApiError::Persistence(e) => {
                tracing::error!(error = %e, span_trace = %e.span_trace(), "書き込みに失敗しました");
            }
            ApiError::Internal(e) => {
                // 内部エラー詳細はログのみ
                tracing::error!("内部エラー: {:?}", e);
            }
            _ => {}
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// 未定義ルートのフォールバック
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// 許可されていないメソッドのフォールバック
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// ハンドラ内の panic を 500 エンベロープに変換する
///
/// `tower_http::catch_panic::CatchPanicLayer::custom` に渡す。
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(anyhow::anyhow!("ハンドラが panic しました: {detail}")).into_response()
}
