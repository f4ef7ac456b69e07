//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "success": true, "data": T, "message"?: String }` を提供する。

use serde::{Deserialize, Serialize};

/// 単一リソースを返す成功レスポンス
///
/// 作成・更新では確認メッセージを添え、取得では `data` のみを返す。
///
/// ## 使用例
///
/// ```
/// use todo_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert!(response.success);
/// assert_eq!(response.data, "hello");
/// assert!(response.message.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data:    T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// データのみの `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// 確認メッセージ付きの `ApiResponse` を作成する
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// データを伴わない成功レスポンス（削除完了など）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
