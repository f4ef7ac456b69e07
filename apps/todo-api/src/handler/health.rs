//! # ヘルスチェックハンドラ
//!
//! ストアへの疎通確認を行い、稼働状態を返す。
//!
//! - 疎通成功 → 200 `{"status": "healthy", "database": "connected"}`
//! - 疎通失敗 → 503 `{"status": "unhealthy", "database": "disconnected", "error": ...}`

use std::{sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use todo_infra::db::ConnectionProbe;
use todo_shared::HealthResponse;

/// 疎通確認のタイムアウト
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェック用の State
pub struct HealthState {
    pub probe: Arc<dyn ConnectionProbe>,
}

/// GET /api/health
#[tracing::instrument(skip_all)]
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    match tokio::time::timeout(PING_TIMEOUT, state.probe.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, Json(HealthResponse::healthy())),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy(e.to_string())),
            )
        }
        Err(_) => {
            tracing::warn!("health check: store ping timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy("store ping timed out")),
            )
        }
    }
}
