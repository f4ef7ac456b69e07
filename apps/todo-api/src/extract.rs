//! # リクエスト抽出器
//!
//! axum 標準の `Json` / `Path` をラップし、拒否時のレスポンスを
//! エラーエンベロープ（[`ApiError`]）に揃える。

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON ボディ
///
/// 不正な JSON、Content-Type 不一致、型の不一致は 400 `Invalid JSON payload` になる。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// パスパラメータ
///
/// 解釈できない値（数値でない ID など）は 404 `Resource not found` になる。
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
