//! # ルートハンドラ
//!
//! サービス名・バージョン・公開エンドポイント一覧を返す。

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app_builder::ENDPOINTS;

/// サービス情報
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub message:   String,
    pub version:   String,
    pub endpoints: Vec<String>,
}

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message:   "Todo List API".to_string(),
        version:   env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(ToString::to_string).collect(),
    })
}
