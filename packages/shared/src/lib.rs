//! # Todo API 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, api）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング関連の依存は `observability` feature の背後に置く

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod list_response;
pub mod observability;

pub use api_response::{ApiResponse, MessageResponse};
pub use error_response::ErrorResponse;
pub use health::{DatabaseStatus, HealthResponse, HealthStatus};
pub use list_response::ListResponse;
