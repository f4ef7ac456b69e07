//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//!
//! メッセージはそのままクライアントに返されるため英語で記述する。
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::DomainError;
//!
//! fn validate_title(title: &str) -> Result<(), DomainError> {
//!     if title.trim().is_empty() {
//!         return Err(DomainError::Validation("Title is required".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_title("  ").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須フィールドの欠落や空文字列など、入力値がルールに違反している場合に使用する。
    #[error("{0}")]
    Validation(String),
}
