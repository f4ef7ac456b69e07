//! # ヘルスチェック共通型
//!
//! `/api/health` が返すレスポンス型を提供する。
//! ストアへの疎通確認結果を `status` と `database` の2軸で表現する。

use serde::{Deserialize, Serialize};

/// サービスの稼働状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// データベース接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// ヘルスチェックレスポンス
///
/// 正常時は `error` を出力しない。
///
/// ## 使用例
///
/// ```
/// use todo_shared::{DatabaseStatus, HealthResponse, HealthStatus};
///
/// let response = HealthResponse::healthy();
/// assert_eq!(response.status, HealthStatus::Healthy);
/// assert_eq!(response.database, DatabaseStatus::Connected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:   HealthStatus,
    pub database: DatabaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:    Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status:   HealthStatus::Healthy,
            database: DatabaseStatus::Connected,
            error:    None,
        }
    }

    /// 疎通確認に失敗した理由を添えて作成する
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status:   HealthStatus::Unhealthy,
            database: DatabaseStatus::Disconnected,
            error:    Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_healthyのserializeで正しいjson形状にする() {
        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "database": "connected"
            })
        );
    }

    #[test]
    fn test_unhealthyのserializeでerrorを含める() {
        let json = serde_json::to_value(HealthResponse::unhealthy("connection refused")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": "connection refused"
            })
        );
    }
}
