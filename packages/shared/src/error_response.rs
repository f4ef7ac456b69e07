//! # エラーレスポンス
//!
//! 全エンドポイント共通のエラーエンベロープ `{ "success": false, "error": String }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はアプリケーション側の責務（shared に axum 依存を入れない）
//! - 固定メッセージを持つエラーは便利コンストラクタで提供する

use serde::{Deserialize, Serialize};

/// 500 系で詳細を伏せる場合の固定メッセージ
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// 未定義ルートへのリクエストに返す固定メッセージ
pub const RESOURCE_NOT_FOUND_MESSAGE: &str = "Resource not found";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub success: bool,
   pub error:   String,
}

impl ErrorResponse {
   /// 任意のメッセージでエラーレスポンスを作成する
   pub fn new(error: impl Into<String>) -> Self {
      Self {
         success: false,
         error:   error.into(),
      }
   }

   /// 未定義ルート用
   pub fn resource_not_found() -> Self {
      Self::new(RESOURCE_NOT_FOUND_MESSAGE)
   }

   /// 500 Internal Server Error
   ///
   /// 内部情報を漏らさないため、メッセージは固定値。
   pub fn internal_error() -> Self {
      Self::new(INTERNAL_SERVER_ERROR_MESSAGE)
   }
}
